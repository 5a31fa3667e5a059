//! Configuration Module
//!
//! Provider/model catalog schema and loading.

pub mod catalog;
pub mod loader;

pub use catalog::Catalog;
pub use loader::{CatalogLoader, CATALOG_PATH_ENV};
