//! In-memory document store
//!
//! Backs tests, previews and the CLI. Ordered by id so listings are stable.

use crate::error::{StoreError, StoreResult};
use crate::store::{DocHeader, DocumentStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use slotgraph_document::{DocId, Document};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared in-memory store
///
/// Cloning yields another handle onto the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<BTreeMap<DocId, Document>>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding `docs` (later duplicates win)
    #[must_use]
    pub fn with_documents(docs: impl IntoIterator<Item = Document>) -> Self {
        let map = docs.into_iter().map(|doc| (doc.id.clone(), doc)).collect();
        Self {
            docs: Arc::new(RwLock::new(map)),
        }
    }

    /// Number of stored documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// True when nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Copy of every stored document, ordered by id
    #[must_use]
    pub fn snapshot(&self) -> Vec<Document> {
        self.docs.read().values().cloned().collect()
    }

    /// Synchronous read for assertions and reporting
    #[must_use]
    pub fn peek(&self, id: &DocId) -> Option<Document> {
        self.docs.read().get(id).cloned()
    }

    /// Write bypassing every engine hook
    ///
    /// Models edits made by tools that do not route through the engine.
    pub fn insert_raw(&self, doc: Document) {
        self.docs.write().insert(doc.id.clone(), doc);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_doc(&self, id: &DocId) -> StoreResult<Option<Document>> {
        Ok(self.docs.read().get(id).cloned())
    }

    async fn put_doc(&self, doc: &Document) -> StoreResult<()> {
        if doc.id.is_empty() {
            return Err(StoreError::MissingId);
        }
        self.docs.write().insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    async fn delete_doc(&self, id: &DocId) -> StoreResult<()> {
        self.docs.write().remove(id);
        Ok(())
    }

    async fn list_doc_headers(&self) -> StoreResult<Vec<DocHeader>> {
        Ok(self.docs.read().values().map(DocHeader::of).collect())
    }
}
