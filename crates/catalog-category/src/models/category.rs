//! Category model for MongoDB

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Category document
///
/// `path` is the materialized ancestor chain: the ids of all ancestors
/// as hex strings, root-most first. A root category has an empty path;
/// for any other category the path is exactly the parent's path plus
/// the parent's own id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<ObjectId>,
    #[serde(default)]
    pub path: Vec<String>,
    /// Soft-deleted categories have this false and are hidden from
    /// tree queries but still occupy storage.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_is_active() -> bool {
    true
}

impl Category {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Category tree node for hierarchical display
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTreeNode {
    pub id: String,
    pub name: String,
    pub children: Vec<CategoryTreeNode>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Acknowledgment returned by a permanent delete
#[derive(Debug, Serialize)]
pub struct DeleteAck {
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub response: DeleteOutcome,
}

/// Raw deletion outcome from the storage layer
#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
    pub acknowledged: bool,
}
