use crate::api::{handlers, middleware, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Search
        .route("/v1/search", post(handlers::search))
        .route("/v1/suggestions", get(handlers::suggestions))
        .route("/v1/suggestions/intelligent", get(handlers::intelligent_suggestions))
        .route("/v1/restaurants/nearby", get(handlers::nearby))
        .route("/v1/searches/popular", get(handlers::popular_searches))
        // Add state
        .with_state(state)
        // Add middleware
        .route_layer(axum::middleware::from_fn(middleware::track_http_metrics))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
