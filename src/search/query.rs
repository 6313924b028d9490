//! Search query building
//!
//! Translates a free-text query, structured filters and sort options into an
//! Elasticsearch/OpenSearch query DSL body.

use crate::search::config::{RankingWeights, SearchConfig};
use crate::search::document::fields;
use crate::search::error::{SearchError, SearchResult};
use crate::search::geo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

/// Sort order for search results
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Field to sort by
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
#[value(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Relevance,
    Rating,
    /// Only meaningful together with a location filter
    Distance,
    DeliveryTime,
}

/// Geo-circle filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoFilter {
    pub lat: f64,
    pub lng: f64,
    /// Distance string such as `5km` or `800m`
    pub radius: String,
}

/// Delivery fee bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Search filter options; every active filter is a hard constraint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    /// Cuisine labels, any of which may match
    pub cuisine: Option<Vec<String>>,

    /// Inclusive lower bound on rating
    #[validate(range(min = 0.0, max = 5.0))]
    pub min_rating: Option<f64>,

    /// Inclusive upper bound on delivery fee
    #[validate(range(min = 0.0))]
    pub max_delivery_fee: Option<f64>,

    /// Open-status flag
    pub is_open: Option<bool>,

    /// Restrict to a radius around a coordinate
    pub location: Option<GeoFilter>,

    /// Delivery fee bounds, applied in addition to `max_delivery_fee`
    pub price_range: Option<PriceRange>,
}

impl SearchFilters {
    pub fn with_cuisine(mut self, cuisines: Vec<impl Into<String>>) -> Self {
        self.cuisine = Some(cuisines.into_iter().map(|c| c.into()).collect());
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_max_delivery_fee(mut self, fee: f64) -> Self {
        self.max_delivery_fee = Some(fee);
        self
    }

    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    pub fn with_location(mut self, lat: f64, lng: f64, radius: impl Into<String>) -> Self {
        self.location = Some(GeoFilter {
            lat,
            lng,
            radius: radius.into(),
        });
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_range = Some(PriceRange { min, max });
        self
    }

    /// Reject filters the index would either refuse or silently misread
    pub fn check(&self) -> SearchResult<()> {
        if let Some(rating) = self.min_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(SearchError::InvalidQuery(format!(
                    "minRating must be between 0 and 5, got {}",
                    rating
                )));
            }
        }
        if self.max_delivery_fee.is_some_and(invalid_fee) {
            return Err(SearchError::InvalidQuery(
                "maxDeliveryFee must be a finite, non-negative amount".to_string(),
            ));
        }
        if let Some(range) = &self.price_range {
            if range.min.is_some_and(invalid_fee) || range.max.is_some_and(invalid_fee) {
                return Err(SearchError::InvalidQuery(
                    "priceRange bounds must be finite, non-negative amounts".to_string(),
                ));
            }
        }
        if let Some(location) = &self.location {
            geo::check_coordinates(location.lat, location.lng)?;
            geo::check_radius(&location.radius)?;
        }
        Ok(())
    }
}

// NaN and infinities serialize to null, which would unbound the range
fn invalid_fee(fee: f64) -> bool {
    !fee.is_finite() || fee < 0.0
}

/// Pagination and ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    /// Zero-based offset
    pub from: usize,

    /// Page size
    #[validate(range(min = 1, max = 100))]
    pub size: usize,

    pub sort_by: SortBy,

    pub sort_order: SortOrder,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            from: 0,
            size: 20,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SearchOptions {
    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }
}

/// Builds full-text search bodies
pub struct QueryBuilder<'a> {
    config: &'a SearchConfig,
}

impl<'a> QueryBuilder<'a> {
    /// Create a new query builder
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    /// Build the complete request body
    pub fn build(&self, query: &str, filters: &SearchFilters, options: &SearchOptions) -> Value {
        let size = self.page_size(options);
        let query = query.trim();

        let mut bool_query = serde_json::Map::new();
        if query.is_empty() {
            bool_query.insert("must".into(), json!([{ "match_all": {} }]));
        } else {
            bool_query.insert("should".into(), Value::Array(self.text_strategies(query)));
            bool_query.insert("minimum_should_match".into(), json!(1));
        }

        let filter_clauses = build_filters(filters);
        if !filter_clauses.is_empty() {
            bool_query.insert("filter".into(), Value::Array(filter_clauses));
        }

        json!({
            "from": options.from,
            "size": size,
            "track_scores": true,
            "query": { "bool": bool_query },
            "aggs": aggregations(),
            "sort": build_sort(filters, options),
        })
    }

    /// Requested page size, clamped to the configured bounds
    pub fn page_size(&self, options: &SearchOptions) -> usize {
        let size = if options.size == 0 {
            self.config.default_page_size
        } else {
            options.size
        };
        size.min(self.config.max_page_size)
    }

    /// The five weighted strategies for a non-empty query
    fn text_strategies(&self, query: &str) -> Vec<Value> {
        let w: &RankingWeights = &self.config.ranking;
        let lowered = query.to_lowercase();

        let mut should = vec![
            json!({
                "multi_match": {
                    "query": query,
                    "type": "phrase",
                    "fields": [
                        field_boost(fields::NAME, w.phrase_name_field),
                        field_boost(fields::DESCRIPTION, w.phrase_description_field),
                        field_boost(fields::CUISINE, w.phrase_cuisine_field),
                    ],
                    "boost": w.phrase,
                }
            }),
            json!({
                "multi_match": {
                    "query": query,
                    "fields": [
                        field_boost(fields::NAME, w.fuzzy_name_field),
                        field_boost(fields::DESCRIPTION, w.fuzzy_description_field),
                        field_boost(fields::CUISINE, w.fuzzy_cuisine_field),
                        fields::STREET,
                        fields::CITY,
                    ],
                    "fuzziness": "AUTO",
                    "boost": w.fuzzy,
                }
            }),
            json!({
                "bool": {
                    "should": [
                        wildcard(fields::NAME_KEYWORD, &lowered, None),
                        wildcard(fields::CUISINE, &lowered, None),
                    ],
                    "boost": w.wildcard,
                }
            }),
        ];

        for token in query_tokens(&lowered, self.config.max_query_tokens) {
            should.push(json!({
                "fuzzy": {
                    (fields::NAME): {
                        "value": token,
                        "fuzziness": token_fuzziness(token),
                        "boost": w.token,
                    }
                }
            }));
        }

        should.push(json!({
            "match": {
                (fields::CUISINE): {
                    "query": query,
                    "fuzziness": "AUTO",
                    "boost": w.cuisine,
                }
            }
        }));

        should
    }
}

/// Whitespace tokens of the query, at most `max_tokens` of them
pub fn query_tokens(query: &str, max_tokens: usize) -> impl Iterator<Item = &str> {
    query.split_whitespace().take(max_tokens)
}

/// Edit distance allowed for one token
pub fn token_fuzziness(token: &str) -> u8 {
    if token.chars().count() > 4 {
        2
    } else {
        1
    }
}

/// `*value*` wildcard clause, case-insensitive
pub(crate) fn wildcard(field: &str, value: &str, boost: Option<f64>) -> Value {
    let mut clause = json!({
        "value": format!("*{}*", escape_wildcard(value)),
        "case_insensitive": true,
    });
    if let Some(boost) = boost {
        clause["boost"] = json!(boost);
    }
    json!({ "wildcard": { field: clause } })
}

/// Escape characters that carry meaning in wildcard patterns
pub fn escape_wildcard(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn field_boost(field: &str, boost: f64) -> String {
    format!("{}^{}", field, boost)
}

/// Hard constraints in non-scoring filter context
pub fn build_filters(filters: &SearchFilters) -> Vec<Value> {
    let mut clauses = Vec::new();

    if let Some(cuisines) = filters.cuisine.as_ref().filter(|c| !c.is_empty()) {
        clauses.push(json!({ "terms": { (fields::CUISINE): cuisines } }));
    }

    if let Some(min_rating) = filters.min_rating {
        clauses.push(json!({ "range": { (fields::RATING): { "gte": min_rating } } }));
    }

    if let Some(max_fee) = filters.max_delivery_fee {
        clauses.push(json!({ "range": { (fields::DELIVERY_FEE): { "lte": max_fee } } }));
    }

    if let Some(is_open) = filters.is_open {
        clauses.push(json!({ "term": { (fields::IS_OPEN): is_open } }));
    }

    if let Some(location) = &filters.location {
        clauses.push(geo::distance_filter(location.lat, location.lng, &location.radius));
    }

    // Kept separate from max_delivery_fee; both ranges apply.
    if let Some(range) = &filters.price_range {
        let mut bounds = serde_json::Map::new();
        if let Some(min) = range.min {
            bounds.insert("gte".into(), json!(min));
        }
        if let Some(max) = range.max {
            bounds.insert("lte".into(), json!(max));
        }
        if !bounds.is_empty() {
            clauses.push(json!({ "range": { (fields::DELIVERY_FEE): bounds } }));
        }
    }

    clauses
}

/// Sort cascade: primary key, then rating, then score
pub fn build_sort(filters: &SearchFilters, options: &SearchOptions) -> Vec<Value> {
    let order = options.sort_order.as_str();
    let mut sort = Vec::with_capacity(3);

    let primary = match (options.sort_by, &filters.location) {
        (SortBy::Rating, _) => json!({ (fields::RATING): { "order": order } }),
        (SortBy::Distance, Some(location)) => geo::distance_sort(location.lat, location.lng, order),
        (SortBy::DeliveryTime, _) => json!({ (fields::DELIVERY_TIME): { "order": order, "missing": "_last" } }),
        (SortBy::Relevance, _) | (SortBy::Distance, None) => json!({ "_score": { "order": order } }),
    };
    sort.push(primary);

    if options.sort_by != SortBy::Rating {
        sort.push(json!({ (fields::RATING): { "order": "desc" } }));
    }
    sort.push(json!({ "_score": { "order": "desc" } }));

    sort
}

/// Whether hits of this request carry a geo distance in `sort[0]`
pub fn sorts_by_distance(filters: &SearchFilters, options: &SearchOptions) -> bool {
    options.sort_by == SortBy::Distance && filters.location.is_some()
}

/// Facet aggregations computed over the whole filtered set
pub fn aggregations() -> Value {
    json!({
        "cuisines": {
            "terms": { "field": fields::CUISINE, "size": 20 }
        },
        "avg_rating": {
            "avg": { "field": fields::RATING }
        },
        "price_ranges": {
            "range": {
                "field": fields::DELIVERY_FEE,
                "ranges": [
                    { "key": "free", "to": 1 },
                    { "key": "low", "from": 1, "to": 50 },
                    { "key": "medium", "from": 50, "to": 100 },
                    { "key": "high", "from": 100 }
                ]
            }
        }
    })
}
