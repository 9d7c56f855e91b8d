//! Data models for category management

mod category;
mod common;

pub use category::*;
pub use common::*;
