//! Object graph facade
//!
//! [`ObjectGraph`] binds a document store to the engine configuration. Each
//! engine component adds its operations to it in its own module.

use crate::config::GraphConfig;
use slotgraph_document::{DocId, Document};
use slotgraph_store::DocumentStore;

/// Engine over one document store
///
/// Holds no graph state of its own: every operation reads the store it
/// needs, so the store stays the only shared mutable resource.
#[derive(Debug, Clone)]
pub struct ObjectGraph<S> {
    store: S,
    config: GraphConfig,
}

impl<S: DocumentStore> ObjectGraph<S> {
    /// Create engine with default configuration
    #[inline]
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, GraphConfig::default())
    }

    /// Create engine with explicit configuration
    #[inline]
    #[must_use]
    pub fn with_config(store: S, config: GraphConfig) -> Self {
        Self { store, config }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Load a document, treating store failures as absence
    ///
    /// Traversals favour progress: a lookup that fails is logged and the walk
    /// continues as if the document did not exist.
    pub(crate) async fn fetch(&self, id: &DocId) -> Option<Document> {
        match self.store.get_doc(id).await {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(%id, "lookup failed, treating as absent: {err}");
                None
            }
        }
    }

    /// Load one instance document
    pub async fn get_instance(&self, id: &DocId) -> Option<Document> {
        if !id.is_instance() {
            return None;
        }
        self.fetch(id).await
    }
}
