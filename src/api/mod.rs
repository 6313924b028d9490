pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::*;

use crate::search::SearchService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    /// Whether `/metrics` serves the Prometheus registry
    pub metrics_enabled: bool,
}

impl AppState {
    pub fn new(search: Arc<SearchService>) -> Self {
        Self {
            search,
            metrics_enabled: true,
        }
    }

    /// Enable or disable the metrics endpoint
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }
}
