//! Parent-link maintenance on instance writes
//!
//! Every write through [`ObjectGraph::put_instance`] re-derives the
//! instance's child references from its effective slots and pushes corrected
//! `parent` / `parentSlot` back-references onto those children before the
//! instance itself is stored. Children dropped from a slot are not detected
//! here; the repair pass handles them.

use crate::audit::{choose_claim, Claim};
use crate::error::{GraphError, GraphResult};
use crate::graph::ObjectGraph;
use chrono::{DateTime, Utc};
use slotgraph_document::{DocId, Document, Meta, Origin, SlotPath};
use slotgraph_store::DocumentStore;
use std::collections::{BTreeMap, BTreeSet};

/// Record a write on `doc`, creating direct-origin metadata if absent
pub(crate) fn stamp_write(doc: &mut Document, at: DateTime<Utc>) {
    match doc.meta.as_mut() {
        Some(meta) => meta.touch(at),
        None => doc.meta = Some(Meta::new(Origin::Direct, at)),
    }
}

/// True when `doc` already points at `parent` through `path`
pub(crate) fn links_to(doc: &Document, parent: &DocId, path: &SlotPath) -> bool {
    doc.parent.as_ref() == Some(parent)
        && doc.parent_slot.as_deref() == Some(path.to_string().as_str())
}

impl<S: DocumentStore> ObjectGraph<S> {
    /// Write an instance, fixing its children's back-references first
    ///
    /// Only children whose link differs are rewritten, so repeating the call
    /// with unchanged slots leaves the children untouched. A child held by
    /// several slots is linked once, keeping its current slot when that is
    /// one of them and otherwise taking the smallest path. Returns the
    /// document as stored.
    ///
    /// # Errors
    /// - `GraphError::MissingId` if the instance has no id
    /// - `GraphError::TransientWrite` if it is a preview document
    /// - `GraphError::Store` if a write fails
    pub async fn put_instance(&self, mut doc: Document) -> GraphResult<Document> {
        if doc.id.is_empty() {
            return Err(GraphError::MissingId);
        }
        if doc.is_transient() {
            return Err(GraphError::TransientWrite(doc.id));
        }

        let at = Utc::now();
        let slots = self.slots_of(&doc).await;
        let mut fixed = 0usize;

        let mut claims: BTreeMap<DocId, BTreeSet<Claim>> = BTreeMap::new();
        for (path, _) in slots.iter() {
            for child_id in doc.child_ids_at(&path) {
                if child_id != doc.id {
                    claims
                        .entry(child_id)
                        .or_default()
                        .insert((doc.id.clone(), path.clone()));
                }
            }
        }

        for (child_id, candidates) in &claims {
            let Some(mut child) = self.fetch(child_id).await else {
                tracing::debug!(parent = %doc.id, child = %child_id, "slot references missing child");
                continue;
            };
            let Some((parent, path)) = choose_claim(&child, candidates) else {
                continue;
            };
            if links_to(&child, &parent, &path) {
                continue;
            }
            if child.is_transient() {
                tracing::warn!(parent = %doc.id, child = %child_id, "not relinking transient child");
                continue;
            }
            child.set_parent_link(Some((parent, &path)));
            stamp_write(&mut child, at);
            self.store().put_doc(&child).await?;
            fixed += 1;
        }

        stamp_write(&mut doc, at);
        self.store().put_doc(&doc).await?;
        tracing::debug!(id = %doc.id, relinked = fixed, "stored instance");
        Ok(doc)
    }

    /// Store a new instance with fresh direct-origin metadata
    ///
    /// An empty id is replaced with a generated one.
    ///
    /// # Errors
    /// Same as [`put_instance`](Self::put_instance)
    pub async fn create_instance(&self, mut doc: Document) -> GraphResult<Document> {
        if doc.id.is_empty() {
            doc.id = DocId::new_instance();
        }
        doc.meta = None;
        self.put_instance(doc).await
    }

    /// Delete an instance
    ///
    /// Back-references held by its children and forward references held by
    /// its parent are left as they are for the repair pass.
    ///
    /// # Errors
    /// Returns `GraphError::Store` if the delete fails
    pub async fn delete_instance(&self, id: &DocId) -> GraphResult<()> {
        self.store().delete_doc(id).await?;
        tracing::info!(%id, "deleted instance");
        Ok(())
    }
}
