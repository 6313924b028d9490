//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Message surfaced to callers when a search cannot be completed
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed, please try again";

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The index could not be reached
    #[error("Index transport error: {0}")]
    Transport(String),

    /// The index did not answer in time
    #[error("Index request timed out: {0}")]
    Timeout(String),

    /// The index answered with a non-success status
    #[error("Index returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The index response could not be decoded
    #[error("Failed to decode index response: {0}")]
    Decode(String),

    /// Caller supplied an unusable query, filter or coordinate
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Generic failure surfaced to callers of the search paths
    #[error("{}", SEARCH_FAILED_MESSAGE)]
    SearchFailed,
}

impl SearchError {
    /// Whether the error came from the index rather than the caller
    pub fn is_index_failure(&self) -> bool {
        matches!(
            self,
            SearchError::Transport(_)
                | SearchError::Timeout(_)
                | SearchError::Status { .. }
                | SearchError::Decode(_)
        )
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout(err.to_string())
        } else if err.is_decode() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Decode(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidQuery(msg) => AppError::Validation(msg),
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::SearchFailed => AppError::SearchUnavailable(SEARCH_FAILED_MESSAGE.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}
