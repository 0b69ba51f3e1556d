//! Error types for the engine
//!
//! Only structural problems are errors. Referential and graph-consistency
//! findings are returned as values ([`ValidationEntry`](crate::ValidationEntry),
//! [`LinkIssue`](crate::LinkIssue), [`RepairStats`](crate::RepairStats)) and
//! traversal bounds truncate with a logged warning.

use slotgraph_document::{DocId, PathError};
use slotgraph_store::StoreError;
use std::path::PathBuf;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Constructed or written instance has no id
    #[error("instance has no id")]
    MissingId,

    /// Attempt to persist a preview document
    #[error("refusing to persist transient document {0}")]
    TransientWrite(DocId),

    /// Document required by the operation does not exist
    #[error("document not found: {0}")]
    NotFound(DocId),

    /// Slot path failed to parse
    #[error("invalid slot path: {0}")]
    InvalidSlotPath(#[from] PathError),

    /// Store rejected a read or write
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl GraphError {
    /// Check if error is structural (caller built a bad document)
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingId | Self::TransientWrite(_))
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration TOML
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for engine operations
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let err = GraphError::TransientWrite(DocId::instance_id("preview"));
        assert_eq!(err.to_string(), "refusing to persist transient document inst:preview");
    }

    #[test]
    fn structural_classification() {
        assert!(GraphError::MissingId.is_structural());
        assert!(!GraphError::NotFound(DocId::instance_id("a")).is_structural());
        assert!(!GraphError::Store(StoreError::MissingId).is_structural());
    }

    #[test]
    fn error_conversions() {
        let err: GraphError = PathError::Empty.into();
        assert!(matches!(err, GraphError::InvalidSlotPath(_)));
    }
}
