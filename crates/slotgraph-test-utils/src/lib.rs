//! Testing utilities for the slotgraph workspace
//!
//! Document builders and small fixture catalogs shared by unit and scenario
//! tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use serde_json::{json, Value};
use slotgraph_document::{DocId, Document, SlotDef};
use slotgraph_store::{DocHeader, DocumentStore, MemoryStore, StoreError, StoreResult};
use std::collections::BTreeSet;

/// Type document `type:<name>` named after `name` with a leading capital
pub fn type_doc(name: &str) -> Document {
    let mut display = name.to_string();
    if let Some(first) = display.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    Document::new(DocId::type_id(name)).with_name(display)
}

/// Make `doc` inherit from `type:<parent>`
pub fn extends(doc: Document, parent: &str) -> Document {
    doc.with_type(DocId::type_id(parent))
}

/// Declare a slot at `kind.slot` on a type document
pub fn with_slot(mut doc: Document, path: &str, def: SlotDef) -> Document {
    let (kind, slot) = path.split_once('.').unwrap();
    doc.declare_slot(kind, slot, &def);
    doc
}

/// Attach a raw `model` declaration
pub fn with_model(doc: Document, model: Value) -> Document {
    doc.with_field("model", model)
}

/// Attach `parts` from `(ref, location)` pairs
pub fn with_parts(doc: Document, parts: &[(&str, &str)]) -> Document {
    let parts: Vec<Value> = parts
        .iter()
        .map(|(reference, location)| json!({ "ref": reference, "location": location }))
        .collect();
    doc.with_field("parts", Value::Array(parts))
}

/// Instance `inst:<name>` of `type:<type_name>`, without metadata
pub fn instance_doc(name: &str, type_name: &str) -> Document {
    Document::new(DocId::instance_id(name)).with_type(DocId::type_id(type_name))
}

/// Point `doc` at `inst:<parent>` through `slot`
pub fn linked_to(mut doc: Document, parent: &str, slot: &str) -> Document {
    doc.parent = Some(DocId::instance_id(parent));
    doc.parent_slot = Some(slot.to_string());
    doc
}

/// Type catalog around a door
///
/// - `type:part`: base with a model offset
/// - `type:frame`, `type:panel`: extend `type:part`
/// - `type:door`: required scalar `children.frame` with a template, and
///   array `children.panels` templated as `L` and `R`; declares a model url
pub fn door_catalog() -> Vec<Document> {
    let part = with_model(type_doc("part"), json!({ "offset": [0.0, 0.5, 0.0] }));
    let frame = extends(type_doc("frame"), "part");
    let panel = extends(type_doc("panel"), "part");

    let door = with_slot(
        type_doc("door"),
        "children.frame",
        serde_json::from_value(json!({
            "type": "type:frame",
            "required": true,
            "template": { "name": "Frame" }
        }))
        .unwrap(),
    );
    let door = with_slot(
        door,
        "children.panels",
        serde_json::from_value(json!({
            "type": "type:panel",
            "array": true,
            "template": [{ "name": "L" }, { "name": "R" }]
        }))
        .unwrap(),
    );
    let door = with_model(door, json!({ "url": "door.glb" }));

    vec![part, frame, panel, door]
}

/// In-memory store holding `docs`
pub fn seeded_store(docs: impl IntoIterator<Item = Document>) -> MemoryStore {
    MemoryStore::with_documents(docs)
}

/// Memory store whose writes to selected ids fail with a backend error
#[derive(Debug, Clone)]
pub struct RejectingStore {
    pub inner: MemoryStore,
    rejected: BTreeSet<DocId>,
}

impl RejectingStore {
    pub fn new(inner: MemoryStore, rejected: impl IntoIterator<Item = DocId>) -> Self {
        Self {
            inner,
            rejected: rejected.into_iter().collect(),
        }
    }
}

#[async_trait]
impl DocumentStore for RejectingStore {
    async fn get_doc(&self, id: &DocId) -> StoreResult<Option<Document>> {
        self.inner.get_doc(id).await
    }

    async fn put_doc(&self, doc: &Document) -> StoreResult<()> {
        if self.rejected.contains(&doc.id) {
            return Err(StoreError::backend(&doc.id, "write rejected"));
        }
        self.inner.put_doc(doc).await
    }

    async fn delete_doc(&self, id: &DocId) -> StoreResult<()> {
        self.inner.delete_doc(id).await
    }

    async fn list_doc_headers(&self) -> StoreResult<Vec<DocHeader>> {
        self.inner.list_doc_headers().await
    }
}
