//! Application state

use crate::config::Config;
use catalog_category::MongoDb;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// MongoDB connection
    pub db: Arc<MongoDb>,

    /// Server configuration
    pub config: Config,
}
