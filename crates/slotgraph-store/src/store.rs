//! Document store contract
//!
//! The engine consumes storage only through [`DocumentStore`]: key-addressed
//! get/put/delete plus a header listing. There is no schema enforcement, no
//! transaction boundary and no optimistic concurrency; a put overwrites the
//! whole document.

use crate::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use slotgraph_document::{DocId, Document};
use std::sync::Arc;

/// Summary row returned by [`DocumentStore::list_doc_headers`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocHeader {
    pub id: DocId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DocHeader {
    /// Header for a document
    #[must_use]
    pub fn of(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            doc_type: doc.doc_type.clone(),
            name: doc.name.clone(),
        }
    }
}

/// Key/value document persistence
///
/// # Contract
/// - `get_doc` returns `Ok(None)` for absent ids, never an error
/// - `put_doc` requires a non-empty `doc.id`
/// - `list_doc_headers` is sorted by id
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load one document
    async fn get_doc(&self, id: &DocId) -> StoreResult<Option<Document>>;

    /// Write (overwrite) one document
    async fn put_doc(&self, doc: &Document) -> StoreResult<()>;

    /// Delete one document; deleting an absent id is not an error
    async fn delete_doc(&self, id: &DocId) -> StoreResult<()>;

    /// Headers of every stored document
    async fn list_doc_headers(&self) -> StoreResult<Vec<DocHeader>>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn get_doc(&self, id: &DocId) -> StoreResult<Option<Document>> {
        (**self).get_doc(id).await
    }

    async fn put_doc(&self, doc: &Document) -> StoreResult<()> {
        (**self).put_doc(doc).await
    }

    async fn delete_doc(&self, id: &DocId) -> StoreResult<()> {
        (**self).delete_doc(id).await
    }

    async fn list_doc_headers(&self) -> StoreResult<Vec<DocHeader>> {
        (**self).list_doc_headers().await
    }
}
