//! Error types for the category module

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for category operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Category module error types
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category with ID {0} not found")]
    CategoryNotFound(String),

    #[error("Parent category with ID {0} not found")]
    ParentNotFound(String),

    #[error("Cannot set a child as the parent (circular reference)")]
    CircularReference,

    #[error("Cannot delete a category that has active children")]
    ActiveChildren,

    #[error("Invalid category ID: {0}")]
    InvalidId(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Database(err.to_string())
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl CatalogError {
    /// Convert to API error code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            CatalogError::ParentNotFound(_) => "PARENT_NOT_FOUND",
            CatalogError::CircularReference => "CIRCULAR_REFERENCE",
            CatalogError::ActiveChildren => "ACTIVE_CHILDREN",
            CatalogError::InvalidId(_) => "INVALID_ID",
            CatalogError::Validation(_) => "VALIDATION_ERROR",
            CatalogError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::CategoryNotFound(_) | CatalogError::ParentNotFound(_) => {
                StatusCode::NOT_FOUND
            }

            CatalogError::CircularReference
            | CatalogError::ActiveChildren
            | CatalogError::InvalidId(_)
            | CatalogError::Validation(_) => StatusCode::BAD_REQUEST,

            CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiError {
            code: self.code().to_string(),
            message: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}
