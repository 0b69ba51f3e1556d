//! Whole-store consistency audit and repair
//!
//! # Responsibility
//!
//! Detects instances whose `parent` / `parentSlot` back-reference disagrees
//! with the forward references held in slots, and rebuilds every
//! back-reference from those forward references.
//!
//! # Core Concepts
//!
//! - **Claim**: a `(parent, slot path)` pair whose slot value names a child
//! - **Tie-break**: when several parents claim one child, the child's current
//!   link is kept if it is among the claims; otherwise the smallest
//!   `(parent id, slot path)` wins
//! - **Orphan**: an instance with a back-reference that no slot claims

use crate::error::GraphResult;
use crate::graph::ObjectGraph;
use crate::links::{links_to, stamp_write};
use crate::slots::EffectiveSlots;
use chrono::Utc;
use serde::Serialize;
use slotgraph_document::{DocId, Document, SlotPath};
use slotgraph_store::DocumentStore;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Kind of back-reference problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkIssueKind {
    /// `parent` names a document that does not exist
    MissingParent,
    /// Parent exists but does not reference the child at `parentSlot`
    ParentMismatch,
}

/// One inconsistent back-reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkIssue {
    pub child: DocId,
    pub parent: DocId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_slot: Option<String>,
    pub kind: LinkIssueKind,
    pub message: String,
}

/// Outcome counters of a repair pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairStats {
    /// Back-references rewritten to match a claim
    pub fixed: usize,
    /// Stale back-references cleared
    pub orphaned: usize,
    /// Documents that could not be read or written
    pub errors: usize,
    /// Claims that lost a tie-break
    pub conflicts: usize,
}

impl RepairStats {
    /// True when the pass changed nothing and hit no errors
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fixed == 0 && self.orphaned == 0 && self.errors == 0
    }
}

pub(crate) type Claim = (DocId, SlotPath);

impl<S: DocumentStore> ObjectGraph<S> {
    /// Report every instance whose back-reference is not honoured by its parent
    ///
    /// # Errors
    /// Returns `GraphError::Store` if the document listing fails
    pub async fn validate_parent_links(&self) -> GraphResult<Vec<LinkIssue>> {
        let headers = self.store().list_doc_headers().await?;
        let mut issues = Vec::new();
        let mut checked = 0usize;

        for header in headers.iter().filter(|h| h.id.is_instance()) {
            let Some(child) = self.fetch(&header.id).await else {
                continue;
            };
            let Some(parent_id) = child.parent.clone() else {
                continue;
            };
            checked += 1;

            let parent = if parent_id.is_instance() {
                self.fetch(&parent_id).await
            } else {
                None
            };
            let Some(parent) = parent else {
                issues.push(LinkIssue {
                    message: format!("parent {parent_id} does not exist"),
                    child: child.id,
                    parent: parent_id,
                    parent_slot: child.parent_slot,
                    kind: LinkIssueKind::MissingParent,
                });
                continue;
            };

            let honoured = child
                .parent_slot_path()
                .is_some_and(|path| parent.references_at(&path, &child.id));
            if !honoured {
                let message = match &child.parent_slot {
                    Some(slot) => format!("parent {parent_id} does not reference {} at {slot}", child.id),
                    None => format!("parent {parent_id} is set without a parent slot"),
                };
                issues.push(LinkIssue {
                    child: child.id,
                    parent: parent_id,
                    parent_slot: child.parent_slot,
                    kind: LinkIssueKind::ParentMismatch,
                    message,
                });
            }
        }

        tracing::info!(checked, issues = issues.len(), "validated parent links");
        Ok(issues)
    }

    /// Rebuild every back-reference from the forward references in slots
    ///
    /// Per-document failures are counted in [`RepairStats::errors`] and the
    /// pass continues.
    ///
    /// # Errors
    /// Returns `GraphError::Store` if the document listing fails
    pub async fn repair_parent_links(&self) -> GraphResult<RepairStats> {
        let mut stats = RepairStats::default();
        let headers = self.store().list_doc_headers().await?;

        let mut instances: Vec<Document> = Vec::new();
        for header in headers.iter().filter(|h| h.id.is_instance()) {
            match self.store().get_doc(&header.id).await {
                Ok(Some(doc)) => instances.push(doc),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(id = %header.id, "repair cannot read document: {err}");
                    stats.errors += 1;
                }
            }
        }

        let claims = self.collect_claims(&instances).await;
        let at = Utc::now();

        for mut doc in instances {
            let wanted = match claims.get(&doc.id) {
                Some(candidates) => {
                    let chosen = choose_claim(&doc, candidates);
                    if candidates.len() > 1 {
                        stats.conflicts += candidates.len() - 1;
                        tracing::warn!(
                            child = %doc.id,
                            claims = candidates.len(),
                            "multiple parents claim one child",
                        );
                    }
                    chosen
                }
                None => None,
            };

            let changed = match &wanted {
                Some((parent, path)) if !links_to(&doc, parent, path) => {
                    doc.set_parent_link(Some((parent.clone(), path)));
                    stats.fixed += 1;
                    true
                }
                Some(_) => false,
                None if doc.parent.is_some() || doc.parent_slot.is_some() => {
                    doc.set_parent_link(None);
                    stats.orphaned += 1;
                    true
                }
                None => false,
            };
            if !changed {
                continue;
            }

            stamp_write(&mut doc, at);
            if let Err(err) = self.store().put_doc(&doc).await {
                tracing::warn!(id = %doc.id, "repair cannot write document: {err}");
                stats.errors += 1;
            }
        }

        tracing::info!(
            fixed = stats.fixed,
            orphaned = stats.orphaned,
            errors = stats.errors,
            conflicts = stats.conflicts,
            "repaired parent links",
        );
        Ok(stats)
    }

    /// Index of child id to every distinct `(parent, slot)` naming it
    async fn collect_claims(&self, instances: &[Document]) -> BTreeMap<DocId, BTreeSet<Claim>> {
        let mut slots_by_type: HashMap<DocId, EffectiveSlots> = HashMap::new();
        let mut claims: BTreeMap<DocId, BTreeSet<Claim>> = BTreeMap::new();

        for doc in instances {
            let Some(type_id) = &doc.doc_type else {
                continue;
            };
            if !slots_by_type.contains_key(type_id) {
                let slots = self.effective_slots(type_id).await;
                slots_by_type.insert(type_id.clone(), slots);
            }
            let Some(slots) = slots_by_type.get(type_id) else {
                continue;
            };
            for (path, _) in slots.iter() {
                for child in doc.child_ids_at(&path) {
                    if child != doc.id {
                        claims
                            .entry(child)
                            .or_default()
                            .insert((doc.id.clone(), path.clone()));
                    }
                }
            }
        }
        claims
    }
}

/// Current link if it is among the claims, else the smallest claim
pub(crate) fn choose_claim(doc: &Document, candidates: &BTreeSet<Claim>) -> Option<Claim> {
    let current = doc.parent.clone().zip(doc.parent_slot_path());
    current
        .filter(|claim| candidates.contains(claim))
        .or_else(|| candidates.first().cloned())
}
