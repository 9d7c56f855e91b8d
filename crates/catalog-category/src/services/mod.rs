//! Services module - business logic layer

pub mod category_service;

pub use category_service::CategoryService;
