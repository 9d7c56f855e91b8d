//! Catalog Category Module
//!
//! This module owns the hierarchical product-category model for the
//! catalog backend: each category stores a materialized `path` of
//! ancestor ids that is kept consistent across creation, reparenting,
//! and deletion, including cascading path rewrites on descendants.
//!
//! # Features
//! - Category CRUD with soft delete (`is_active` flag) and hard delete
//! - Materialized ancestor paths with cycle prevention on reparent
//! - Active-category tree queries
//! - MongoDB persistence with index management

pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

pub use db::MongoDb;
pub use error::{CatalogError, CatalogResult};
