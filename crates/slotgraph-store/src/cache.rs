//! Read-through document cache using moka
//!
//! Chain resolution re-reads the same type documents on every call; types
//! are authored once and rarely change, so a read-through cache in front of
//! the store removes most of those round trips.

use crate::error::StoreResult;
use crate::store::{DocHeader, DocumentStore};
use async_trait::async_trait;
use moka::future::Cache;
use slotgraph_document::{DocId, Document};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups forwarded to the inner store
    pub misses: u64,
}

/// Caching decorator over any [`DocumentStore`]
///
/// Only present documents are cached. Writes and deletes go straight to the
/// inner store, bump a write counter, then invalidate the cached entry. A
/// miss that raced a write drops the entry it just filled.
#[derive(Debug, Clone)]
pub struct CachedStore<S> {
    inner: S,
    cache: Cache<DocId, Arc<Document>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    writes: Arc<AtomicU64>,
}

impl<S: DocumentStore> CachedStore<S> {
    /// Wrap `inner` with a cache of at most `max_capacity` documents
    #[inline]
    #[must_use]
    pub fn new(inner: S, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_capacity),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Inner store
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached entry
    ///
    /// Call after the inner store was edited behind the cache's back.
    #[inline]
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.cache.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for CachedStore<S> {
    async fn get_doc(&self, id: &DocId) -> StoreResult<Option<Document>> {
        if let Some(cached) = self.cache.get(id).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some((*cached).clone()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let generation = self.writes.load(Ordering::Acquire);
        let loaded = self.inner.get_doc(id).await?;
        if let Some(doc) = &loaded {
            self.cache.insert(id.clone(), Arc::new(doc.clone())).await;
            if self.writes.load(Ordering::Acquire) != generation {
                self.cache.invalidate(id).await;
            }
        }
        Ok(loaded)
    }

    async fn put_doc(&self, doc: &Document) -> StoreResult<()> {
        self.inner.put_doc(doc).await?;
        self.writes.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate(&doc.id).await;
        Ok(())
    }

    async fn delete_doc(&self, id: &DocId) -> StoreResult<()> {
        self.inner.delete_doc(id).await?;
        self.writes.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate(id).await;
        Ok(())
    }

    async fn list_doc_headers(&self) -> StoreResult<Vec<DocHeader>> {
        self.inner.list_doc_headers().await
    }
}
