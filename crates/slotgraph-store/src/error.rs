//! Error types for the store layer
//!
//! Provides error handling for:
//! - Document store operations (get/put/delete/list)
//! - Seed file loading

use slotgraph_document::DocId;
use std::path::PathBuf;

/// Errors raised by a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Document written without an id
    #[error("document has no id")]
    MissingId,

    /// Backend failure the store could not interpret
    #[error("store backend error on {id}: {message}")]
    Backend { id: DocId, message: String },
}

impl StoreError {
    /// Create backend error for a document
    pub fn backend(id: &DocId, message: impl Into<String>) -> Self {
        Self::Backend {
            id: id.clone(),
            message: message.into(),
        }
    }
}

/// Errors while loading or applying a seed set
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON
    #[error("invalid seed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON parsed but is not a list of documents
    #[error("seed entry {index} is not a document: {message}")]
    InvalidEntry { index: usize, message: String },

    /// Store rejected a write or delete
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SeedError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::backend(&DocId::instance_id("a"), "disk full");
        assert_eq!(err.to_string(), "store backend error on inst:a: disk full");
    }

    #[test]
    fn seed_error_from_store() {
        let err: SeedError = StoreError::MissingId.into();
        assert!(matches!(err, SeedError::Store(StoreError::MissingId)));
    }
}
