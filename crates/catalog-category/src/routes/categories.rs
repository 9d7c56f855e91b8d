//! Category API routes

use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::AppState;
use crate::error::CatalogError;
use crate::models::{double_option, Category, CategoryTreeNode, DeleteAck};
use crate::services::CategoryService;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    /// Accepted by the API contract; creation always yields an active
    /// category regardless of the value sent.
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    /// Tri-state: absent leaves the parent alone, explicit null detaches
    /// to root, a value reparents.
    #[serde(rename = "parentId", default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<String>>,
    /// Accepted by the API contract but not applied; soft delete goes
    /// through DELETE.
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    pub path: Vec<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: c.name,
            parent_id: c.parent_id.map(|id| id.to_hex()),
            path: c.path,
            is_active: c.is_active,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

pub fn category_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_category))
        .route("/tree", get(get_category_tree))
        .route(
            "/{id}",
            patch(update_category).delete(remove_category),
        )
        .route("/permanent/{id}", delete(permanent_remove_category))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<CategoryResponse>, CatalogError> {
    req.validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;

    let service = CategoryService::new((*state.db).clone());
    let category = service.create(&req.name, req.parent_id.as_deref()).await?;
    Ok(Json(category.into()))
}

async fn get_category_tree(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryTreeNode>>, CatalogError> {
    let service = CategoryService::new((*state.db).clone());
    let tree = service.find_tree().await?;
    Ok(Json(tree))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, CatalogError> {
    if let Some(name) = req.name.as_deref() {
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "name must not be empty".to_string(),
            ));
        }
    }

    let service = CategoryService::new((*state.db).clone());
    let category = service.update(&id, req.name, req.parent_id).await?;
    Ok(Json(category.into()))
}

async fn remove_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, CatalogError> {
    let service = CategoryService::new((*state.db).clone());
    let category = service.remove(&id).await?;
    Ok(Json(category.into()))
}

async fn permanent_remove_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, CatalogError> {
    let service = CategoryService::new((*state.db).clone());
    let ack = service.permanent_remove(&id).await?;
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_create_request_rejects_empty_name() {
        let req: CreateCategoryRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateCategoryRequest =
            serde_json::from_str(r#"{"name": "Electronics"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.parent_id.is_none());
    }

    #[test]
    fn test_update_request_parent_tri_state() {
        let req: UpdateCategoryRequest = serde_json::from_str(r#"{"name": "Audio"}"#).unwrap();
        assert_eq!(req.parent_id, None);

        let req: UpdateCategoryRequest =
            serde_json::from_str(r#"{"parentId": null}"#).unwrap();
        assert_eq!(req.parent_id, Some(None));

        let req: UpdateCategoryRequest =
            serde_json::from_str(r#"{"parentId": "507f1f77bcf86cd799439011"}"#).unwrap();
        assert_eq!(
            req.parent_id,
            Some(Some("507f1f77bcf86cd799439011".to_string()))
        );
    }

    #[test]
    fn test_category_response_wire_shape() {
        let now = Utc::now();
        let parent = ObjectId::new();
        let category = Category {
            id: Some(ObjectId::new()),
            name: "Phones".to_string(),
            parent_id: Some(parent),
            path: vec![parent.to_hex()],
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(CategoryResponse::from(category)).unwrap();
        assert_eq!(json["name"], "Phones");
        assert_eq!(json["parentId"], parent.to_hex());
        assert_eq!(json["isActive"], true);
        assert!(json["createdAt"].is_string());
        assert_eq!(json["path"][0], parent.to_hex());
    }

    #[test]
    fn test_root_category_response_has_null_parent() {
        let now = Utc::now();
        let category = Category {
            id: Some(ObjectId::new()),
            name: "Electronics".to_string(),
            parent_id: None,
            path: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(CategoryResponse::from(category)).unwrap();
        assert!(json["parentId"].is_null());
        assert_eq!(json["path"].as_array().unwrap().len(), 0);
    }
}
