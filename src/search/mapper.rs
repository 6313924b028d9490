//! Raw index responses and their mapping into the public result shapes

use crate::search::document::Restaurant;
use crate::search::geo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Response body of a `_search` call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexResponse {
    #[serde(default)]
    pub took: Option<u64>,

    #[serde(default)]
    pub hits: IndexHits,

    #[serde(default)]
    pub aggregations: HashMap<String, RawAggregation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexHits {
    #[serde(default)]
    pub total: Option<TotalHits>,

    #[serde(default)]
    pub hits: Vec<IndexHit>,
}

/// `hits.total` is an object on ES 7+/OpenSearch and a bare number before that
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Object { value: u64 },
    Count(u64),
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Object { value } => *value,
            TotalHits::Count(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexHit {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    #[serde(rename = "_source", default)]
    pub source: Option<Value>,

    #[serde(default)]
    pub sort: Vec<Value>,
}

/// Aggregation result; only the parts the engine reads are modelled
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAggregation {
    #[serde(default)]
    pub value: Option<f64>,

    #[serde(default)]
    pub buckets: Vec<RawBucket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBucket {
    pub key: Value,

    #[serde(default)]
    pub doc_count: u64,
}

impl RawBucket {
    fn key_string(&self) -> String {
        match &self.key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// A restaurant returned by a search or nearby lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantHit {
    #[serde(flatten)]
    pub restaurant: Restaurant,

    /// Relevance score for text queries
    #[serde(rename = "_score", skip_serializing_if = "Option::is_none", default)]
    pub score: Option<f64>,

    /// Distance from the query point in km, for geo-sorted results
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<f64>,
}

/// Facet bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    pub key: String,
    pub count: u64,
}

/// Facet summary over the whole filtered set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAggregations {
    pub cuisines: Vec<FacetCount>,
    pub avg_rating: f64,
    pub price_ranges: Vec<FacetCount>,
}

/// Search response with results and metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub restaurants: Vec<RestaurantHit>,

    /// Total number of hits (before pagination)
    pub total: u64,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub aggregations: Option<SearchAggregations>,
}

/// Map a full-text search response
///
/// `with_distance` is set when the primary sort was geo distance; the
/// distance is then read from `sort[0]`.
pub fn map_search_response(response: IndexResponse, with_distance: bool) -> SearchResponse {
    let aggregations = map_aggregations(&response.aggregations);
    let restaurants = map_hits(response.hits.hits, with_distance);
    let total = response
        .hits
        .total
        .map(|t| t.value())
        .unwrap_or(restaurants.len() as u64)
        .max(restaurants.len() as u64);

    SearchResponse {
        restaurants,
        total,
        aggregations,
    }
}

/// Map raw hits into restaurants, skipping hits without a usable source
pub fn map_hits(hits: Vec<IndexHit>, with_distance: bool) -> Vec<RestaurantHit> {
    hits.into_iter()
        .filter_map(|hit| {
            let source = hit.source?;
            let mut restaurant: Restaurant = match serde_json::from_value(source) {
                Ok(restaurant) => restaurant,
                Err(e) => {
                    tracing::warn!(id = %hit.id, error = %e, "Skipping hit with malformed source");
                    return None;
                }
            };
            if restaurant.id.is_empty() {
                restaurant.id = hit.id;
            }
            let distance = if with_distance {
                geo::distance_from_sort(&hit.sort)
            } else {
                None
            };
            Some(RestaurantHit {
                restaurant,
                score: hit.score,
                distance,
            })
        })
        .collect()
}

fn map_aggregations(aggs: &HashMap<String, RawAggregation>) -> Option<SearchAggregations> {
    if aggs.is_empty() {
        return None;
    }

    Some(SearchAggregations {
        cuisines: bucket_counts(aggs.get("cuisines")),
        avg_rating: aggs.get("avg_rating").and_then(|a| a.value).unwrap_or(0.0),
        price_ranges: bucket_counts(aggs.get("price_ranges")),
    })
}

/// Bucket keys in index order
pub fn bucket_keys(agg: Option<&RawAggregation>) -> Vec<String> {
    agg.map(|a| a.buckets.iter().map(RawBucket::key_string).collect())
        .unwrap_or_default()
}

fn bucket_counts(agg: Option<&RawAggregation>) -> Vec<FacetCount> {
    agg.map(|a| {
        a.buckets
            .iter()
            .map(|b| FacetCount {
                key: b.key_string(),
                count: b.doc_count,
            })
            .collect()
    })
    .unwrap_or_default()
}
