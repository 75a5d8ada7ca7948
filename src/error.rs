//! Muninn error types

use crate::storage::StorageError;

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum MuninnError {
    // Fetch/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP status {status} fetching {url}")]
    Status { status: u16, url: String },

    // Frame host errors
    #[error("frame error: {0}")]
    Frame(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    // Storage medium errors (internal; never escape the cache API)
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;
