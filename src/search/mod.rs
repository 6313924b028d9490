//! Typo-tolerant restaurant search over an Elasticsearch-compatible index
//!
//! This module provides the search capabilities behind the restaurant
//! listing, autocomplete and map views:
//!
//! - **Full-Text Search**: five match strategies (phrase, fuzzy, wildcard,
//!   per-token fuzzy, cuisine) combined with `minimum_should_match: 1`
//! - **Filters**: cuisine, rating, delivery fee, open status, radius, price
//! - **Ranking**: relevance, rating, distance or delivery time with
//!   deterministic tie-breakers
//! - **Facets**: cuisine counts, average rating and delivery-fee bands
//! - **Suggestions**: aggregation tier with a loose fuzzy fallback, plus a
//!   synonym-aware variant
//! - **Geo**: open restaurants near a point, nearest first
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           Search Service API                     │
//! ├─────────────────────────────────────────────────┤
//! │  - search()            - nearby()               │
//! │  - suggest()           - popular_searches()     │
//! │  - intelligent_suggest()                        │
//! └─────────────────────────────────────────────────┘
//!          │                         │
//!          ▼                         ▼
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ QueryBuilder / geo   │  │ SuggestionPipeline   │
//! │ (query DSL bodies)   │  │ (tiers + synonyms)   │
//! └──────────────────────┘  └──────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │     IndexClient (HTTP, `_search` endpoint)       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use restaurant_search::config::IndexConfig;
//! use restaurant_search::search::{
//!     HttpIndexClient, SearchConfig, SearchFilters, SearchOptions, SearchService,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpIndexClient::new(&IndexConfig::default())?;
//!     let search = SearchService::new(Arc::new(client), SearchConfig::default());
//!
//!     let filters = SearchFilters::default()
//!         .with_cuisine(vec!["Italian"])
//!         .with_min_rating(4.0);
//!
//!     let results = search.search("piza", &filters, &SearchOptions::default()).await?;
//!     println!("Found {} restaurants", results.total);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod document;
mod error;
pub mod geo;
mod mapper;
mod query;
mod service;
pub mod suggest;
mod synonyms;

pub use client::{HttpIndexClient, IndexClient};
pub use config::{RankingWeights, SearchConfig, SearchConfigBuilder, SuggestionWeights};
pub use document::{fields, Address, GeoPoint, Restaurant};
pub use error::{SearchError, SearchResult, SEARCH_FAILED_MESSAGE};
pub use mapper::{
    map_hits, map_search_response, FacetCount, IndexHit, IndexHits, IndexResponse, RawAggregation,
    RawBucket, RestaurantHit, SearchAggregations, SearchResponse, TotalHits,
};
pub use query::{
    GeoFilter, PriceRange, QueryBuilder, SearchFilters, SearchOptions, SortBy, SortOrder,
};
pub use service::SearchService;
pub use synonyms::{expand_query, MapSynonymProvider, StaticSynonymTable, SynonymProvider};
