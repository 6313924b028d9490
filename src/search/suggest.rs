//! Autocomplete suggestions
//!
//! Suggestions come from an ordered list of tiers. Each tier either finds
//! something or reports that it came back empty; the pipeline stops at the
//! first tier that finds something. The default pipeline is a precise,
//! aggregation-based tier followed by a loose fuzzy tier over raw hits.

use crate::search::client::IndexClient;
use crate::search::config::SuggestionWeights;
use crate::search::document::fields;
use crate::search::error::SearchResult;
use crate::search::mapper::{bucket_keys, IndexResponse};
use crate::search::query::wildcard;
use crate::search::synonyms::{expand_query, SynonymProvider};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Queries shorter than this never reach the index
pub const MIN_SUGGEST_CHARS: usize = 2;

const NAME_BUCKETS: usize = 10;
const CUISINE_BUCKETS: usize = 5;
const FALLBACK_HITS: usize = 10;
const MAX_EXPANSIONS: usize = 50;

/// Outcome of a single tier
#[derive(Debug, Clone, PartialEq)]
pub enum TierVerdict {
    Empty,
    Found(Vec<String>),
}

impl TierVerdict {
    fn from_suggestions(suggestions: Vec<String>) -> Self {
        if suggestions.is_empty() {
            TierVerdict::Empty
        } else {
            TierVerdict::Found(suggestions)
        }
    }
}

/// One step of the suggestion pipeline
#[async_trait]
pub trait SuggestionTier: Send + Sync {
    /// Short name used in logs and metrics
    fn name(&self) -> &'static str;

    async fn run(&self, client: &dyn IndexClient, query: &str) -> SearchResult<TierVerdict>;
}

/// Result of running the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutcome {
    pub suggestions: Vec<String>,
    /// Tier that produced the suggestions, if any did
    pub tier: Option<&'static str>,
    /// Number of tiers executed
    pub tiers_run: usize,
}

/// Ordered tiers, tried one after another until one finds something
pub struct SuggestionPipeline {
    tiers: Vec<Box<dyn SuggestionTier>>,
    limit: usize,
}

impl SuggestionPipeline {
    pub fn new(limit: usize) -> Self {
        Self {
            tiers: Vec::new(),
            limit,
        }
    }

    pub fn with_tier(mut self, tier: impl SuggestionTier + 'static) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    /// Run tiers in order. A tier only starts after the previous one has
    /// completed empty; an error stops the pipeline.
    pub async fn run(&self, client: &dyn IndexClient, query: &str) -> SearchResult<PipelineOutcome> {
        let mut outcome = PipelineOutcome::default();

        for tier in &self.tiers {
            outcome.tiers_run += 1;
            match tier.run(client, query).await? {
                TierVerdict::Found(suggestions) => {
                    outcome.suggestions = dedup_truncate(suggestions, self.limit);
                    outcome.tier = Some(tier.name());
                    return Ok(outcome);
                }
                TierVerdict::Empty => {
                    tracing::debug!(tier = tier.name(), query = %query, "Suggestion tier came back empty");
                }
            }
        }

        Ok(outcome)
    }
}

/// Precise tier: fuzzy/wildcard strategies with name and cuisine aggregations
#[derive(Debug, Clone)]
pub struct AggregatedTier {
    weights: SuggestionWeights,
    limit: usize,
}

impl AggregatedTier {
    pub fn new(weights: SuggestionWeights, limit: usize) -> Self {
        Self { weights, limit }
    }
}

#[async_trait]
impl SuggestionTier for AggregatedTier {
    fn name(&self) -> &'static str {
        "aggregated"
    }

    async fn run(&self, client: &dyn IndexClient, query: &str) -> SearchResult<TierVerdict> {
        let response = client.search(&primary_body(query, &self.weights)).await?;
        Ok(TierVerdict::from_suggestions(collect_aggregated(&response, self.limit)))
    }
}

/// Precise tier over a synonym-expanded query
pub struct SynonymTier {
    provider: Arc<dyn SynonymProvider>,
    weights: SuggestionWeights,
    max_terms: usize,
    limit: usize,
}

impl SynonymTier {
    pub fn new(
        provider: Arc<dyn SynonymProvider>,
        weights: SuggestionWeights,
        max_terms: usize,
        limit: usize,
    ) -> Self {
        Self {
            provider,
            weights,
            max_terms,
            limit,
        }
    }
}

#[async_trait]
impl SuggestionTier for SynonymTier {
    fn name(&self) -> &'static str {
        "synonyms"
    }

    async fn run(&self, client: &dyn IndexClient, query: &str) -> SearchResult<TierVerdict> {
        let terms = expand_query(self.provider.as_ref(), query, self.max_terms);
        if terms.is_empty() {
            return Ok(TierVerdict::Empty);
        }
        tracing::debug!(query = %query, terms = ?terms, "Expanded suggestion query");

        let response = client.search(&synonym_body(&terms, &self.weights)).await?;
        Ok(TierVerdict::from_suggestions(collect_aggregated(&response, self.limit)))
    }
}

/// Loose tier: edit distance 2 with no prefix requirement, over raw hits
#[derive(Debug, Clone)]
pub struct LooseFuzzyTier {
    limit: usize,
}

impl LooseFuzzyTier {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl SuggestionTier for LooseFuzzyTier {
    fn name(&self) -> &'static str {
        "loose_fuzzy"
    }

    async fn run(&self, client: &dyn IndexClient, query: &str) -> SearchResult<TierVerdict> {
        let response = client.search(&fallback_body(query)).await?;
        Ok(TierVerdict::from_suggestions(collect_names(&response, self.limit)))
    }
}

/// Whether a query is long enough to be worth suggesting for
pub fn is_suggestable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SUGGEST_CHARS
}

fn suggestion_aggs() -> Value {
    json!({
        "restaurant_names": {
            "terms": { "field": fields::NAME_KEYWORD, "size": NAME_BUCKETS, "order": { "_count": "desc" } }
        },
        "cuisines": {
            "terms": { "field": fields::CUISINE, "size": CUISINE_BUCKETS, "order": { "_count": "desc" } }
        }
    })
}

/// Aggregation-only body for the precise tier
pub fn primary_body(query: &str, weights: &SuggestionWeights) -> Value {
    let query = query.trim();
    let lowered = query.to_lowercase();

    json!({
        "size": 0,
        "query": {
            "bool": {
                "should": [
                    {
                        "fuzzy": {
                            (fields::NAME): {
                                "value": lowered,
                                "fuzziness": "AUTO",
                                "prefix_length": 1,
                                "max_expansions": MAX_EXPANSIONS,
                                "boost": weights.fuzzy_name,
                            }
                        }
                    },
                    wildcard(fields::NAME_KEYWORD, &lowered, Some(weights.wildcard_name)),
                    {
                        "fuzzy": {
                            (fields::CUISINE): {
                                "value": lowered,
                                "fuzziness": "AUTO",
                                "boost": weights.fuzzy_cuisine,
                            }
                        }
                    },
                    {
                        "match": {
                            (fields::NAME): {
                                "query": query,
                                "fuzziness": "AUTO",
                                "operator": "or",
                                "boost": weights.loose_name,
                            }
                        }
                    }
                ],
                "minimum_should_match": 1
            }
        },
        "aggs": suggestion_aggs(),
    })
}

/// Aggregation-only body over expanded terms; the first term is the
/// caller's own and is boosted above the synonyms
pub fn synonym_body(terms: &[String], weights: &SuggestionWeights) -> Value {
    let mut should = Vec::with_capacity(terms.len() * 3);

    for (i, term) in terms.iter().enumerate() {
        let boost = if i == 0 {
            weights.original_term
        } else {
            weights.synonym_term
        };

        should.push(json!({
            "match": {
                (fields::NAME): {
                    "query": term,
                    "fuzziness": "AUTO",
                    "prefix_length": 1,
                    "boost": boost,
                }
            }
        }));
        should.push(wildcard(fields::NAME_KEYWORD, term, Some(boost)));
        should.push(json!({
            "match": {
                (fields::CUISINE): {
                    "query": term,
                    "fuzziness": "AUTO",
                    "boost": boost,
                }
            }
        }));
    }

    json!({
        "size": 0,
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1
            }
        },
        "aggs": suggestion_aggs(),
    })
}

/// Raw-hit body for the loose tier
pub fn fallback_body(query: &str) -> Value {
    json!({
        "size": FALLBACK_HITS,
        "_source": [fields::NAME],
        "query": {
            "match": {
                (fields::NAME): {
                    "query": query.trim(),
                    "fuzziness": 2,
                    "prefix_length": 0,
                }
            }
        }
    })
}

/// Names then cuisines from the suggestion aggregations
pub fn collect_aggregated(response: &IndexResponse, limit: usize) -> Vec<String> {
    let names = bucket_keys(response.aggregations.get("restaurant_names"));
    let cuisines = bucket_keys(response.aggregations.get("cuisines"));
    dedup_truncate(names.into_iter().chain(cuisines), limit)
}

/// Restaurant names from raw hits
pub fn collect_names(response: &IndexResponse, limit: usize) -> Vec<String> {
    let names = response.hits.hits.iter().filter_map(|hit| {
        hit.source
            .as_ref()
            .and_then(|s| s.get(fields::NAME))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    dedup_truncate(names, limit)
}

/// Order-preserving deduplication, capped at `limit`
pub fn dedup_truncate(items: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty() && seen.insert(item.clone()))
        .take(limit)
        .collect()
}
