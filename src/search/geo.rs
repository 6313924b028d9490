//! Proximity queries: geo-distance filters, distance sorting and the
//! nearby-restaurants lookup.

use crate::search::document::fields;
use crate::search::error::{SearchError, SearchResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

static RADIUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*(mm|cm|m|km|mi|yd|ft|in|nmi)$").expect("radius pattern is valid")
});

/// Validate a latitude/longitude pair
pub fn check_coordinates(lat: f64, lng: f64) -> SearchResult<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(SearchError::InvalidQuery(format!("latitude out of range: {}", lat)));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(SearchError::InvalidQuery(format!("longitude out of range: {}", lng)));
    }
    Ok(())
}

/// Validate a distance string such as `5km`
pub fn check_radius(radius: &str) -> SearchResult<()> {
    let captures = RADIUS_PATTERN
        .captures(radius.trim())
        .ok_or_else(|| SearchError::InvalidQuery(format!("invalid radius: {:?}", radius)))?;

    let amount: f64 = captures[1]
        .parse()
        .map_err(|_| SearchError::InvalidQuery(format!("invalid radius: {:?}", radius)))?;
    if amount <= 0.0 {
        return Err(SearchError::InvalidQuery(format!("radius must be positive: {:?}", radius)));
    }
    Ok(())
}

fn point(lat: f64, lng: f64) -> Value {
    json!({ "lat": lat, "lon": lng })
}

/// `geo_distance` filter clause
pub fn distance_filter(lat: f64, lng: f64, radius: &str) -> Value {
    json!({
        "geo_distance": {
            "distance": radius.split_whitespace().collect::<String>(),
            (fields::LOCATION): point(lat, lng),
        }
    })
}

/// `_geo_distance` sort clause in kilometres
pub fn distance_sort(lat: f64, lng: f64, order: &str) -> Value {
    json!({
        "_geo_distance": {
            (fields::LOCATION): point(lat, lng),
            "order": order,
            "unit": "km",
        }
    })
}

/// Body for the nearby lookup: open restaurants inside the radius,
/// nearest first, better rated first on ties
pub fn nearby_body(lat: f64, lng: f64, radius: &str, limit: usize) -> Value {
    json!({
        "size": limit,
        "query": {
            "bool": {
                "filter": [
                    distance_filter(lat, lng, radius),
                    { "term": { (fields::IS_OPEN): true } }
                ]
            }
        },
        "sort": [
            distance_sort(lat, lng, "asc"),
            { (fields::RATING): { "order": "desc" } }
        ]
    })
}

/// Distance in km from the first sort value of a geo-sorted hit
pub fn distance_from_sort(sort: &[Value]) -> Option<f64> {
    sort.first().and_then(Value::as_f64)
}
