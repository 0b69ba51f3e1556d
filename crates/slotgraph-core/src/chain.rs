//! Type chain resolution
//!
//! Follows a type's `type` reference to its parent type, repeatedly, and
//! returns the ancestry base-first. The walk stops on a missing document, a
//! reference outside the type namespace, a repeated id or the depth bound.

use crate::graph::ObjectGraph;
use slotgraph_document::{DocId, Document};
use slotgraph_store::DocumentStore;
use std::collections::HashSet;

/// Ancestry of a type, most general first
///
/// A short chain means partial ancestry, not failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeChain {
    members: Vec<Document>,
    truncated: bool,
}

impl TypeChain {
    /// Member documents, base first
    #[inline]
    #[must_use]
    pub fn members(&self) -> &[Document] {
        &self.members
    }

    /// Member ids, base first
    #[must_use]
    pub fn ids(&self) -> Vec<DocId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The type the chain was resolved from
    #[inline]
    #[must_use]
    pub fn most_specific(&self) -> Option<&Document> {
        self.members.last()
    }

    /// True when `id` is the resolved type or one of its ancestors
    #[must_use]
    pub fn contains(&self, id: &DocId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    /// True when the walk stopped on a cycle or the depth bound
    #[inline]
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<S: DocumentStore> ObjectGraph<S> {
    /// Resolve the ancestry of `type_id`, following at most `max_depth` hops
    ///
    /// Returns at most `max_depth + 1` members and always terminates, even on
    /// cyclic `type` references.
    pub async fn type_chain(&self, type_id: &DocId, max_depth: usize) -> TypeChain {
        let mut chain = TypeChain::default();
        let mut visited = HashSet::new();
        let mut cursor = Some(type_id.clone());

        while let Some(id) = cursor.take() {
            if !id.is_type() {
                break;
            }
            if !visited.insert(id.clone()) {
                tracing::warn!(start = %type_id, %id, "type chain cycle, truncating");
                chain.truncated = true;
                break;
            }
            let Some(doc) = self.fetch(&id).await else {
                tracing::debug!(start = %type_id, %id, "type chain ends at missing document");
                break;
            };

            cursor = doc.doc_type.clone();
            chain.members.push(doc);

            if chain.members.len() > max_depth {
                if cursor.as_ref().is_some_and(DocId::is_type) {
                    tracing::warn!(start = %type_id, max_depth, "type chain exceeds depth bound, truncating");
                    chain.truncated = true;
                }
                break;
            }
        }

        chain.members.reverse();
        chain
    }

    /// Resolve the ancestry of `type_id` with the configured depth bound
    pub async fn resolve_chain(&self, type_id: &DocId) -> TypeChain {
        self.type_chain(type_id, self.config().max_type_depth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotgraph_store::MemoryStore;
    use slotgraph_test_utils::{extends, type_doc};

    fn graph(docs: Vec<Document>) -> ObjectGraph<MemoryStore> {
        ObjectGraph::new(MemoryStore::with_documents(docs))
    }

    #[tokio::test]
    async fn base_first_order() {
        let g = graph(vec![
            type_doc("a"),
            extends(type_doc("b"), "a"),
            extends(type_doc("c"), "b"),
        ]);
        let chain = g.type_chain(&DocId::type_id("c"), 10).await;
        assert_eq!(
            chain.ids(),
            vec![DocId::type_id("a"), DocId::type_id("b"), DocId::type_id("c")]
        );
        assert!(!chain.is_truncated());
    }

    #[tokio::test]
    async fn missing_parent_truncates_silently() {
        let g = graph(vec![extends(type_doc("b"), "ghost")]);
        let chain = g.type_chain(&DocId::type_id("b"), 10).await;
        assert_eq!(chain.ids(), vec![DocId::type_id("b")]);
        assert!(!chain.is_truncated());
    }

    #[tokio::test]
    async fn non_type_reference_stops() {
        let mut b = type_doc("b");
        b.doc_type = Some(DocId::instance_id("oops"));
        let g = graph(vec![b]);
        assert_eq!(g.type_chain(&DocId::type_id("b"), 10).await.len(), 1);
        assert!(g.type_chain(&DocId::instance_id("oops"), 10).await.is_empty());
    }

    #[tokio::test]
    async fn cycle_terminates() {
        let g = graph(vec![extends(type_doc("a"), "b"), extends(type_doc("b"), "a")]);
        let chain = g.type_chain(&DocId::type_id("a"), 10).await;
        assert_eq!(chain.ids(), vec![DocId::type_id("b"), DocId::type_id("a")]);
        assert!(chain.is_truncated());
    }

    #[tokio::test]
    async fn self_reference_terminates() {
        let g = graph(vec![extends(type_doc("a"), "a")]);
        assert_eq!(g.type_chain(&DocId::type_id("a"), 10).await.len(), 1);
    }

    #[tokio::test]
    async fn depth_bound_limits_length() {
        let g = graph(vec![
            type_doc("a"),
            extends(type_doc("b"), "a"),
            extends(type_doc("c"), "b"),
        ]);
        let chain = g.type_chain(&DocId::type_id("c"), 1).await;
        assert_eq!(chain.ids(), vec![DocId::type_id("b"), DocId::type_id("c")]);
        assert!(chain.is_truncated());
        assert_eq!(g.type_chain(&DocId::type_id("c"), 0).await.len(), 1);
    }

    #[tokio::test]
    async fn contains_checks_ancestry() {
        let g = graph(vec![type_doc("a"), extends(type_doc("b"), "a")]);
        let chain = g.resolve_chain(&DocId::type_id("b")).await;
        assert!(chain.contains(&DocId::type_id("a")));
        assert!(!chain.contains(&DocId::type_id("z")));
        assert_eq!(chain.most_specific().map(|d| d.id.clone()), Some(DocId::type_id("b")));
    }
}
