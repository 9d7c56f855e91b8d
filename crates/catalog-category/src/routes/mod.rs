//! HTTP routes module

pub mod categories;

use crate::db::MongoDb;
use axum::Router;
use std::sync::Arc;

/// App state shared by the category routes
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<MongoDb>,
}

/// Configure the category API under its versioned prefix
pub fn configure(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1/category", categories::category_routes())
        .with_state(state)
}
