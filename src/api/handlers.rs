use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::gather_metrics;
use crate::search::{RestaurantHit, SearchFilters, SearchOptions, SearchResponse};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    if !state.metrics_enabled {
        return Err(AppError::NotFound("metrics are disabled".to_string()));
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    ))
}

/// Full-text restaurant search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    request.validate()?;

    let response = state
        .search
        .search(&request.query, &request.filters, &request.options)
        .await?;

    Ok(Json(response))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SearchRequest {
    #[validate(length(max = 256))]
    pub query: String,
    #[validate(nested)]
    pub filters: SearchFilters,
    #[validate(nested)]
    pub options: SearchOptions,
}

/// Autocomplete suggestions
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionQuery>,
) -> Result<Json<SuggestionResponse>> {
    let suggestions = state.search.suggest(&params.q).await;
    Ok(Json(SuggestionResponse {
        query: params.q,
        suggestions,
    }))
}

/// Synonym-aware autocomplete suggestions
pub async fn intelligent_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionQuery>,
) -> Result<Json<SuggestionResponse>> {
    let suggestions = state.search.intelligent_suggest(&params.q).await;
    Ok(Json(SuggestionResponse {
        query: params.q,
        suggestions,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub query: String,
    pub suggestions: Vec<String>,
}

/// Open restaurants near a coordinate
pub async fn nearby(
    State(state): State<AppState>,
    Query(params): Query<NearbyQuery>,
) -> Result<Json<NearbyResponse>> {
    let restaurants = state
        .search
        .nearby(params.lat, params.lng, params.radius.as_deref(), params.limit)
        .await?;

    Ok(Json(NearbyResponse {
        count: restaurants.len(),
        restaurants,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub restaurants: Vec<RestaurantHit>,
    pub count: usize,
}

/// Static list of popular searches
pub async fn popular_searches(State(state): State<AppState>) -> Result<Json<PopularSearchesResponse>> {
    Ok(Json(PopularSearchesResponse {
        searches: state.search.popular_searches().to_vec(),
    }))
}

#[derive(Debug, Serialize)]
pub struct PopularSearchesResponse {
    pub searches: Vec<String>,
}
