//! Learning-resource catalog: a persistent store of categories and
//! resources, catalog operations over it, an HTML + JSON presentation layer,
//! and an offline cache worker for the served assets.

pub mod catalog;
pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod offline;
pub mod storage;
pub mod web;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{CatalogError, Result};
