//! Search configuration

use serde::{Deserialize, Serialize};

/// Boost weights for the strategies composed into a full-text search.
///
/// The values were tuned against production traffic; keep them together so
/// tuning does not touch query-shape logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Exact sequential phrase across name/description/cuisine
    pub phrase: f64,
    /// Typo-tolerant multi-field match
    pub fuzzy: f64,
    /// Case-insensitive substring match on name/cuisine
    pub wildcard: f64,
    /// Each per-token fuzzy clause on name
    pub token: f64,
    /// Fuzzy match restricted to the cuisine field
    pub cuisine: f64,

    /// Field boosts inside the phrase strategy
    pub phrase_name_field: f64,
    pub phrase_description_field: f64,
    pub phrase_cuisine_field: f64,

    /// Field boosts inside the fuzzy strategy
    pub fuzzy_name_field: f64,
    pub fuzzy_description_field: f64,
    pub fuzzy_cuisine_field: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            phrase: 3.0,
            fuzzy: 2.0,
            wildcard: 1.5,
            token: 1.0,
            cuisine: 1.2,
            phrase_name_field: 5.0,
            phrase_description_field: 3.0,
            phrase_cuisine_field: 2.0,
            fuzzy_name_field: 4.0,
            fuzzy_description_field: 2.5,
            fuzzy_cuisine_field: 2.0,
        }
    }
}

/// Boost weights for the autocomplete strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionWeights {
    pub fuzzy_name: f64,
    pub wildcard_name: f64,
    pub fuzzy_cuisine: f64,
    pub loose_name: f64,
    /// Boost for the caller's own term when synonyms are expanded
    pub original_term: f64,
    /// Boost for terms produced by synonym expansion
    pub synonym_term: f64,
}

impl Default for SuggestionWeights {
    fn default() -> Self {
        Self {
            fuzzy_name: 3.0,
            wildcard_name: 2.0,
            fuzzy_cuisine: 1.5,
            loose_name: 1.0,
            original_term: 3.0,
            synonym_term: 2.0,
        }
    }
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size used when the caller does not pass one
    pub default_page_size: usize,

    /// Upper bound on any requested page size
    pub max_page_size: usize,

    /// Maximum number of per-token fuzzy clauses generated from one query
    pub max_query_tokens: usize,

    /// Maximum number of suggestions returned
    pub suggestion_limit: usize,

    /// Maximum number of terms (original included) after synonym expansion
    pub max_synonym_terms: usize,

    /// Radius used by nearby lookups when none is given
    pub nearby_default_radius: String,

    /// Result cap used by nearby lookups when none is given
    pub nearby_default_limit: usize,

    /// Static list served by the popular-searches endpoint
    pub popular_searches: Vec<String>,

    /// Full-text strategy weights
    pub ranking: RankingWeights,

    /// Autocomplete strategy weights
    pub suggestion_weights: SuggestionWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            max_query_tokens: 8,
            suggestion_limit: 8,
            max_synonym_terms: 5,
            nearby_default_radius: "5km".to_string(),
            nearby_default_limit: 20,
            popular_searches: [
                "Pizza",
                "Burger",
                "Chinese",
                "Japanese",
                "Filipino",
                "Korean",
                "Coffee",
                "Milk Tea",
                "Desserts",
                "Fried Chicken",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ranking: RankingWeights::default(),
            suggestion_weights: SuggestionWeights::default(),
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn default_page_size(mut self, size: usize) -> Self {
        self.config.default_page_size = size;
        self
    }

    pub fn max_page_size(mut self, size: usize) -> Self {
        self.config.max_page_size = size;
        self
    }

    pub fn max_query_tokens(mut self, tokens: usize) -> Self {
        self.config.max_query_tokens = tokens;
        self
    }

    pub fn suggestion_limit(mut self, limit: usize) -> Self {
        self.config.suggestion_limit = limit;
        self
    }

    pub fn max_synonym_terms(mut self, terms: usize) -> Self {
        self.config.max_synonym_terms = terms;
        self
    }

    pub fn nearby_default_radius(mut self, radius: impl Into<String>) -> Self {
        self.config.nearby_default_radius = radius.into();
        self
    }

    pub fn nearby_default_limit(mut self, limit: usize) -> Self {
        self.config.nearby_default_limit = limit;
        self
    }

    pub fn popular_searches(mut self, searches: Vec<impl Into<String>>) -> Self {
        self.config.popular_searches = searches.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn ranking(mut self, weights: RankingWeights) -> Self {
        self.config.ranking = weights;
        self
    }

    pub fn suggestion_weights(mut self, weights: SuggestionWeights) -> Self {
        self.config.suggestion_weights = weights;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
