//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search and index synchronization.
///
/// Unrecognized price phrases are not errors: the parser falls back to a
/// plain keyword search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The index store could not be reached or rejected the request
    #[error("Search index unavailable: {0}")]
    IndexUnavailable(String),

    /// A canonical product has no category to project
    #[error("Product {product_id} has no category")]
    DataIntegrity { product_id: u64 },

    /// Reading the canonical catalog failed
    #[error("Catalog read failed: {0}")]
    Catalog(String),

    /// Index initialization failed
    #[error("Index initialization failed: {0}")]
    IndexInitFailed(String),
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::IndexUnavailable(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::IndexUnavailable(msg) => AppError::Unavailable(msg),
            SearchError::DataIntegrity { .. } => AppError::DataIntegrity(err.to_string()),
            SearchError::Catalog(msg) => AppError::Database(msg),
            SearchError::IndexInitFailed(_) => AppError::Internal(err.to_string()),
        }
    }
}
