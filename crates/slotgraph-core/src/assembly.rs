//! Parts flattening
//!
//! # Responsibility
//!
//! Expands a composite document's `parts` tree into leaf placements whose
//! locations are composed from every enclosing part.
//!
//! # Core Concepts
//!
//! - **Explicit stack**: depth-first in authored part order, no recursion
//! - **Ancestors**: each pending part carries the ids on its expansion path;
//!   a part already on that path is a cycle and is skipped
//! - **Depth**: the root's parts sit at depth 1; a composite at the bound is
//!   not expanded

use crate::graph::ObjectGraph;
use serde::Serialize;
use slotgraph_document::{DocId, Document, Location, ModelDescriptor, PartRef};
use slotgraph_store::DocumentStore;

/// A leaf of a flattened assembly
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub id: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Location in the frame the expansion started from
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelDescriptor>,
}

struct Pending {
    part: PartRef,
    base: Location,
    depth: usize,
    ancestors: Vec<DocId>,
}

impl<S: DocumentStore> ObjectGraph<S> {
    /// Flatten `doc` into leaf placements relative to `parent_location`
    ///
    /// A document without parts yields a single placement of itself.
    /// Unresolved parts, cycles and parts beyond `max_depth` are skipped with
    /// a warning.
    pub async fn expand_children(
        &self,
        doc: &Document,
        parent_location: Location,
        max_depth: usize,
    ) -> Vec<Placement> {
        if !doc.is_composite() {
            return vec![self.place(doc, parent_location).await];
        }

        let mut placements = Vec::new();
        let mut stack: Vec<Pending> = Vec::new();
        if max_depth == 0 {
            tracing::warn!(id = %doc.id, "parts depth bound is zero, nothing expanded");
        } else {
            push_parts(&mut stack, doc, parent_location, 1, &[]);
        }

        while let Some(pending) = stack.pop() {
            let id = &pending.part.reference;
            if pending.ancestors.contains(id) {
                tracing::warn!(root = %doc.id, part = %id, "parts cycle, skipping");
                continue;
            }
            let Some(part) = self.fetch(id).await else {
                tracing::warn!(root = %doc.id, part = %id, "unresolved part, skipping");
                continue;
            };
            let location = pending
                .base
                .compose(&pending.part.location, self.config().composition);

            if !part.is_composite() {
                placements.push(self.place(&part, location).await);
            } else if pending.depth >= max_depth {
                tracing::warn!(root = %doc.id, part = %id, max_depth, "parts depth exceeded, truncating");
            } else {
                push_parts(&mut stack, &part, location, pending.depth + 1, &pending.ancestors);
            }
        }

        tracing::debug!(id = %doc.id, leaves = placements.len(), "expanded parts");
        placements
    }

    /// Flatten a stored document with the configured depth bound
    ///
    /// Starts from `location`, else the document's own location, else the
    /// origin. Returns `None` if the document does not exist.
    pub async fn expand_by_id(&self, id: &DocId, location: Option<Location>) -> Option<Vec<Placement>> {
        let doc = self.fetch(id).await?;
        let start = location.or_else(|| doc.location()).unwrap_or(Location::ORIGIN);
        Some(self.expand_children(&doc, start, self.config().max_parts_depth).await)
    }

    async fn place(&self, doc: &Document, location: Location) -> Placement {
        Placement {
            id: doc.id.clone(),
            name: doc.name.clone(),
            location,
            model: self.effective_model(doc).await,
        }
    }
}

fn push_parts(stack: &mut Vec<Pending>, composite: &Document, base: Location, depth: usize, ancestors: &[DocId]) {
    let mut path = ancestors.to_vec();
    path.push(composite.id.clone());
    for part in composite.parts().into_iter().rev() {
        stack.push(Pending {
            part,
            base,
            depth,
            ancestors: path.clone(),
        });
    }
}
