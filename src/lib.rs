//! Restaurant search service
//!
//! Typo-tolerant full-text search, autocomplete and geo lookup for a food
//! delivery catalogue held in an Elasticsearch-compatible index, exposed as a
//! library and as an axum HTTP service.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod search;

pub use config::Config;
pub use error::{AppError, Result};
