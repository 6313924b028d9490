use crate::metrics::HTTP_REQUESTS_TOTAL;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

/// Paths left out of request accounting
const EXCLUDED_PATHS: &[&str] = &["/health", "/metrics"];

/// Count every routed request by method, matched route and status.
///
/// Uses the route template (`/v1/restaurants/nearby`) rather than the raw
/// URI so query strings never reach label values.
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    if !EXCLUDED_PATHS.contains(&path.as_str()) {
        let status = response.status().as_u16().to_string();
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[&method, &path, &status])
            .inc();
    }

    response
}
