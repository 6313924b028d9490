//! Main search service implementation

use crate::metrics::{OperationTimer, SUGGESTION_FALLBACKS_TOTAL};
use crate::search::client::IndexClient;
use crate::search::config::SearchConfig;
use crate::search::error::{SearchError, SearchResult};
use crate::search::geo;
use crate::search::mapper::{map_hits, map_search_response, RestaurantHit, SearchResponse};
use crate::search::query::{sorts_by_distance, QueryBuilder, SearchFilters, SearchOptions};
use crate::search::suggest::{
    is_suggestable, AggregatedTier, LooseFuzzyTier, SuggestionPipeline, SynonymTier,
};
use crate::search::synonyms::{StaticSynonymTable, SynonymProvider};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Main search service
///
/// Stateless apart from configuration: every call builds its own request,
/// so one instance can be shared freely between tasks.
pub struct SearchService {
    client: Arc<dyn IndexClient>,
    config: SearchConfig,
    synonyms: Arc<dyn SynonymProvider>,
}

impl SearchService {
    /// Create a new search service using the built-in synonym table
    pub fn new(client: Arc<dyn IndexClient>, config: SearchConfig) -> Self {
        Self {
            client,
            config,
            synonyms: Arc::new(StaticSynonymTable),
        }
    }

    /// Replace the synonym source used by intelligent suggestions
    pub fn with_synonyms(mut self, provider: Arc<dyn SynonymProvider>) -> Self {
        self.synonyms = provider;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Full-text restaurant search with filters, sorting and facets.
    ///
    /// Index failures are logged and surfaced as [`SearchError::SearchFailed`];
    /// no partial result is ever returned.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> SearchResult<SearchResponse> {
        let timer = OperationTimer::start("search");

        if let Err(e) = filters.check() {
            timer.finish("invalid");
            return Err(e);
        }

        let builder = QueryBuilder::new(&self.config);
        let size = builder.page_size(options);
        let body = builder.build(query, filters, options);
        debug!(query = %query, body = %body, "Executing restaurant search");

        let response = match self.client.search(&body).await {
            Ok(response) => response,
            Err(e) => {
                timer.finish("error");
                error!(query = %query, error = %e, "Restaurant search failed");
                return Err(SearchError::SearchFailed);
            }
        };

        let mut result = map_search_response(response, sorts_by_distance(filters, options));
        result.restaurants.truncate(size);

        let took_ms = timer.finish("ok");
        info!(
            query = %query,
            total = result.total,
            returned = result.restaurants.len(),
            took_ms = took_ms,
            "Restaurant search completed"
        );

        Ok(result)
    }

    /// Autocomplete suggestions; never fails
    pub async fn suggest(&self, query: &str) -> Vec<String> {
        let pipeline = SuggestionPipeline::new(self.config.suggestion_limit)
            .with_tier(AggregatedTier::new(
                self.config.suggestion_weights.clone(),
                self.config.suggestion_limit,
            ))
            .with_tier(LooseFuzzyTier::new(self.config.suggestion_limit));

        self.run_suggestions("suggest", pipeline, query).await
    }

    /// Autocomplete over a synonym-expanded query; never fails
    pub async fn intelligent_suggest(&self, query: &str) -> Vec<String> {
        let pipeline = SuggestionPipeline::new(self.config.suggestion_limit)
            .with_tier(SynonymTier::new(
                self.synonyms.clone(),
                self.config.suggestion_weights.clone(),
                self.config.max_synonym_terms,
                self.config.suggestion_limit,
            ))
            .with_tier(LooseFuzzyTier::new(self.config.suggestion_limit));

        self.run_suggestions("intelligent_suggest", pipeline, query).await
    }

    async fn run_suggestions(
        &self,
        operation: &'static str,
        pipeline: SuggestionPipeline,
        query: &str,
    ) -> Vec<String> {
        if !is_suggestable(query) {
            return Vec::new();
        }

        let timer = OperationTimer::start(operation);
        match pipeline.run(self.client.as_ref(), query).await {
            Ok(outcome) => {
                if outcome.tiers_run > 1 {
                    SUGGESTION_FALLBACKS_TOTAL.inc();
                }
                let took_ms = timer.finish("ok");
                debug!(
                    operation = operation,
                    query = %query,
                    tier = outcome.tier.unwrap_or("none"),
                    count = outcome.suggestions.len(),
                    took_ms = took_ms,
                    "Suggestions resolved"
                );
                outcome.suggestions
            }
            Err(e) => {
                timer.finish("error");
                warn!(operation = operation, query = %query, error = %e, "Suggestion lookup failed");
                Vec::new()
            }
        }
    }

    /// Open restaurants within `radius` of a point, nearest first
    pub async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius: Option<&str>,
        limit: Option<usize>,
    ) -> SearchResult<Vec<RestaurantHit>> {
        let timer = OperationTimer::start("nearby");

        let radius = radius.unwrap_or(&self.config.nearby_default_radius);
        if let Err(e) = geo::check_coordinates(lat, lng).and_then(|_| geo::check_radius(radius)) {
            timer.finish("invalid");
            return Err(e);
        }

        let limit = match limit {
            Some(0) | None => self.config.nearby_default_limit,
            Some(limit) => limit,
        }
        .min(self.config.max_page_size);

        let body = geo::nearby_body(lat, lng, radius, limit);
        let response = match self.client.search(&body).await {
            Ok(response) => response,
            Err(e) => {
                timer.finish("error");
                error!(lat = lat, lng = lng, radius = %radius, error = %e, "Nearby search failed");
                return Err(SearchError::SearchFailed);
            }
        };

        let mut restaurants = map_hits(response.hits.hits, true);
        restaurants.truncate(limit);

        let took_ms = timer.finish("ok");
        info!(
            lat = lat,
            lng = lng,
            radius = %radius,
            returned = restaurants.len(),
            took_ms = took_ms,
            "Nearby search completed"
        );

        Ok(restaurants)
    }

    /// Popular searches; served from configuration without an index call
    pub fn popular_searches(&self) -> &[String] {
        &self.config.popular_searches
    }
}
