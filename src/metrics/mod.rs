//! Prometheus metrics for the restaurant search service.
//!
//! All metrics live in one process-wide registry. Call [`init_metrics`] once
//! at startup; [`gather_metrics`] renders the text exposition format.
//!
//! # Example
//! ```no_run
//! use restaurant_search::metrics::SEARCH_REQUESTS_TOTAL;
//!
//! SEARCH_REQUESTS_TOTAL
//!     .with_label_values(&["search", "ok"])
//!     .inc();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Engine operations by outcome
    ///
    /// Labels: operation (search, suggest, intelligent_suggest, nearby), outcome
    pub static ref SEARCH_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("search_requests_total", "Total number of search engine operations")
            .namespace("restaurant_search"),
        &["operation", "outcome"]
    ).expect("Failed to create SEARCH_REQUESTS_TOTAL metric");

    /// Engine operation duration in seconds, index round-trips included
    ///
    /// Labels: operation
    pub static ref SEARCH_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "search_request_duration_seconds",
            "Search engine operation duration in seconds"
        )
        .namespace("restaurant_search")
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["operation"]
    ).expect("Failed to create SEARCH_REQUEST_DURATION_SECONDS metric");

    /// Suggestion requests answered by the loose fallback tier
    pub static ref SUGGESTION_FALLBACKS_TOTAL: Counter = Counter::with_opts(
        Opts::new("suggestion_fallbacks_total", "Suggestion requests that escalated to the fallback tier")
            .namespace("restaurant_search")
    ).expect("Failed to create SUGGESTION_FALLBACKS_TOTAL metric");

    /// HTTP requests served
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("restaurant_search"),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");
}

/// Register all metrics with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SUGGESTION_FALLBACKS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    Ok(())
}

/// Render all registered metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}

/// Records the duration and outcome of one engine operation
pub struct OperationTimer {
    operation: &'static str,
    started: Instant,
}

impl OperationTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            started: Instant::now(),
        }
    }

    /// Record with the given outcome label and return elapsed milliseconds
    pub fn finish(self, outcome: &str) -> u64 {
        let elapsed = self.started.elapsed();
        SEARCH_REQUEST_DURATION_SECONDS
            .with_label_values(&[self.operation])
            .observe(elapsed.as_secs_f64());
        SEARCH_REQUESTS_TOTAL
            .with_label_values(&[self.operation, outcome])
            .inc();
        elapsed.as_millis() as u64
    }
}
