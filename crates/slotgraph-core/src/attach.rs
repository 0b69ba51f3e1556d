//! Model attachment resolution
//!
//! Folds the `model` declarations along a document's type chain into one
//! [`ModelDescriptor`]. Each layer overrides only the fields it declares.

use crate::graph::ObjectGraph;
use slotgraph_document::{DocId, Document, ModelDescriptor, ModelSpec};
use slotgraph_store::DocumentStore;

impl<S: DocumentStore> ObjectGraph<S> {
    /// Effective model of a type or instance
    ///
    /// Layers run from the base of the chain named by the document's `type`
    /// to the document's own `model`. Returns `None` when no layer declares
    /// a model.
    pub async fn effective_model(&self, doc: &Document) -> Option<ModelDescriptor> {
        let mut layers: Vec<ModelSpec> = Vec::new();

        if let Some(type_id) = &doc.doc_type {
            let chain = self.resolve_chain(type_id).await;
            layers.extend(
                chain
                    .members()
                    .iter()
                    .filter(|member| member.id != doc.id)
                    .filter_map(Document::model_spec),
            );
        }
        layers.extend(doc.model_spec());

        if layers.is_empty() {
            return None;
        }
        let mut model = ModelDescriptor::default();
        for layer in &layers {
            model.apply(layer);
        }
        Some(model)
    }

    /// Effective model of a stored document
    pub async fn effective_model_by_id(&self, id: &DocId) -> Option<ModelDescriptor> {
        let doc = self.fetch(id).await?;
        self.effective_model(&doc).await
    }
}
