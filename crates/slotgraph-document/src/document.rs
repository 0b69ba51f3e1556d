//! Schema-less documents
//!
//! A [`Document`] keeps the fields every engine pass relies on as typed
//! members and carries everything else (slot values, slot declarations,
//! models, parts, authoring data) in an open extension bag. The slot-path
//! indexer (`get_path` / `set_path` / `remove_path`) addresses values in
//! that bag by [`SlotPath`].

use crate::id::DocId;
use crate::path::SlotPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a document came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Created directly by a caller
    Direct,
    /// Synthesized from a slot template
    Template,
    /// Loaded from a seed set
    Seed,
    /// Any origin tag this crate does not know
    #[serde(other)]
    Other,
}

/// Bookkeeping stamped on instance documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Creation path
    pub origin: Origin,
    /// First write time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
    /// Write counter, starting at 1
    #[serde(default)]
    pub version: u64,
    /// Marks preview documents that must never reach permanent storage
    #[serde(default, skip_serializing_if = "is_false")]
    pub transient: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl Meta {
    /// Fresh metadata for a document created at `at`
    #[must_use]
    pub fn new(origin: Origin, at: DateTime<Utc>) -> Self {
        Self {
            origin,
            created_at: at,
            updated_at: at,
            version: 1,
            transient: false,
        }
    }

    /// Flag as transient
    #[inline]
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Record another write at `at`
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
        self.version += 1;
    }
}

/// A stored document, type or instance
///
/// # Invariants
/// - `id` must be non-empty before the document is written anywhere
/// - `fields` never contains the keys of the typed members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    /// Globally unique id; its prefix fixes the namespace
    #[serde(default)]
    pub id: DocId,
    /// Parent type (types) or instantiated type (instances)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocId>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Containing instance, absent at root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<DocId>,
    /// Dotted slot path in `parent` that holds this id
    #[serde(rename = "parentSlot", default, skip_serializing_if = "Option::is_none")]
    pub parent_slot: Option<String>,
    /// Instance bookkeeping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    /// Every other field, in authored order
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Empty document with the given id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<DocId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Parse a document from a JSON value
    ///
    /// # Errors
    /// Returns error if the value is not a document-shaped object
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        serde_json::from_value(value).map_err(DocumentError::Malformed)
    }

    /// Render the document as a JSON value
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// With type reference
    #[inline]
    #[must_use]
    pub fn with_type(mut self, doc_type: impl Into<DocId>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With a top-level extension field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_field(key, value);
        self
    }

    /// With a value at a slot path
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: &SlotPath, value: Value) -> Self {
        self.set_path(path, value);
        self
    }

    /// Top-level extension field
    #[inline]
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a top-level field, routing known keys to their typed members
    ///
    /// Used when copying template or override objects onto a document.
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match key.as_str() {
            "id" => {
                if let Value::String(raw) = value {
                    self.id = DocId::new(raw);
                }
            }
            "type" => self.doc_type = value.as_str().map(DocId::from),
            "name" => self.name = value.as_str().map(str::to_string),
            "parent" => self.parent = value.as_str().map(DocId::from),
            "parentSlot" => self.parent_slot = value.as_str().map(str::to_string),
            "meta" => self.meta = serde_json::from_value(value).ok(),
            _ => {
                self.fields.insert(key, value);
            }
        }
    }

    /// Copy every entry of `object` onto this document (later keys win)
    pub fn merge_object(&mut self, object: &Map<String, Value>) {
        for (key, value) in object {
            self.set_field(key.clone(), value.clone());
        }
    }

    /// Value at a slot path
    #[must_use]
    pub fn get_path(&self, path: &SlotPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut cursor = self.fields.get(first)?;
        for segment in rest {
            cursor = cursor.as_object()?.get(segment)?;
        }
        Some(cursor)
    }

    /// Write a value at a slot path
    ///
    /// Missing intermediate objects are created; non-object intermediates
    /// are replaced.
    pub fn set_path(&mut self, path: &SlotPath, value: Value) {
        let Some((leaf, parents)) = path.segments().split_last() else {
            return;
        };
        let mut cursor = &mut self.fields;
        for segment in parents {
            let slot = cursor.entry(segment.clone()).or_insert(Value::Null);
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            cursor = match slot {
                Value::Object(map) => map,
                _ => return,
            };
        }
        cursor.insert(leaf.clone(), value);
    }

    /// Remove and return the value at a slot path
    pub fn remove_path(&mut self, path: &SlotPath) -> Option<Value> {
        let (leaf, parents) = path.segments().split_last()?;
        let mut cursor = &mut self.fields;
        for segment in parents {
            cursor = cursor.get_mut(segment)?.as_object_mut()?;
        }
        cursor.remove(leaf)
    }

    /// Instance ids held at a slot path, scalar or sequence
    ///
    /// Strings outside the instance namespace are ignored.
    #[must_use]
    pub fn child_ids_at(&self, path: &SlotPath) -> Vec<DocId> {
        match self.get_path(path) {
            Some(Value::String(raw)) => {
                let id = DocId::new(raw.as_str());
                if id.is_instance() {
                    vec![id]
                } else {
                    Vec::new()
                }
            }
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(DocId::from)
                .filter(DocId::is_instance)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// True when the value at `path` equals `id` or is a sequence containing it
    #[must_use]
    pub fn references_at(&self, path: &SlotPath, id: &DocId) -> bool {
        match self.get_path(path) {
            Some(Value::String(raw)) => raw == id.as_str(),
            Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(id.as_str())),
            _ => false,
        }
    }

    /// True when `meta.transient` is set
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.meta.as_ref().is_some_and(|m| m.transient)
    }

    /// Parsed `parentSlot`, if present and well-formed
    #[must_use]
    pub fn parent_slot_path(&self) -> Option<SlotPath> {
        self.parent_slot.as_deref().and_then(|raw| raw.parse().ok())
    }

    /// Set or clear the parent link in one step
    pub fn set_parent_link(&mut self, parent: Option<(DocId, &SlotPath)>) {
        match parent {
            Some((id, slot)) => {
                self.parent = Some(id);
                self.parent_slot = Some(slot.to_string());
            }
            None => {
                self.parent = None;
                self.parent_slot = None;
            }
        }
    }
}

/// Errors related to documents
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// JSON value could not be read as a document
    #[error("malformed document: {0}")]
    Malformed(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path(raw: &str) -> SlotPath {
        raw.parse().unwrap()
    }

    #[test]
    fn known_fields_are_typed_and_rest_is_kept() {
        let doc = Document::from_value(json!({
            "id": "inst:a",
            "type": "type:door",
            "name": "Door",
            "parent": "inst:house",
            "parentSlot": "children.doors",
            "children": { "frame": "inst:a_frame_0" },
            "color": "red"
        }))
        .unwrap();

        assert_eq!(doc.id, DocId::instance_id("a"));
        assert_eq!(doc.doc_type, Some(DocId::type_id("door")));
        assert_eq!(doc.parent_slot.as_deref(), Some("children.doors"));
        assert_eq!(doc.field("color"), Some(&json!("red")));
        assert!(!doc.fields.contains_key("parent"));
    }

    #[test]
    fn missing_id_parses_as_empty() {
        let doc = Document::from_value(json!({ "name": "anonymous" })).unwrap();
        assert!(doc.id.is_empty());
    }

    #[test]
    fn serialization_round_trips_unknown_fields() {
        let value = json!({
            "id": "type:door",
            "name": "Door",
            "slots": { "children": { "slots": { "frame": { "type": "type:frame" } } } }
        });
        let doc = Document::from_value(value.clone()).unwrap();
        assert_eq!(doc.to_value(), value);
    }

    #[test]
    fn get_and_set_nested_path() {
        let mut doc = Document::new("inst:a");
        doc.set_path(&path("children.frame"), json!("inst:f"));
        assert_eq!(doc.get_path(&path("children.frame")), Some(&json!("inst:f")));
        assert_eq!(doc.to_value()["children"]["frame"], json!("inst:f"));
    }

    #[test]
    fn set_path_replaces_scalar_intermediate() {
        let mut doc = Document::new("inst:a").with_field("children", json!(3));
        doc.set_path(&path("children.frame"), json!("inst:f"));
        assert_eq!(doc.get_path(&path("children.frame")), Some(&json!("inst:f")));
    }

    #[test]
    fn remove_path_returns_value() {
        let mut doc = Document::new("inst:a").with_path(&path("children.frame"), json!("inst:f"));
        assert_eq!(doc.remove_path(&path("children.frame")), Some(json!("inst:f")));
        assert_eq!(doc.get_path(&path("children.frame")), None);
        assert_eq!(doc.remove_path(&path("children.missing")), None);
    }

    #[test]
    fn child_ids_filter_namespace() {
        let doc = Document::new("inst:a").with_path(
            &path("children.cells"),
            json!(["inst:c0", "type:cell", 4, "inst:c1"]),
        );
        assert_eq!(
            doc.child_ids_at(&path("children.cells")),
            vec![DocId::instance_id("c0"), DocId::instance_id("c1")]
        );
    }

    #[test]
    fn references_scalar_and_sequence() {
        let doc = Document::new("inst:a")
            .with_path(&path("children.frame"), json!("inst:f"))
            .with_path(&path("children.cells"), json!(["inst:c0"]));
        assert!(doc.references_at(&path("children.frame"), &DocId::instance_id("f")));
        assert!(doc.references_at(&path("children.cells"), &DocId::instance_id("c0")));
        assert!(!doc.references_at(&path("children.cells"), &DocId::instance_id("f")));
    }

    #[test]
    fn set_field_routes_known_keys() {
        let mut doc = Document::new("inst:a");
        doc.set_field("name", json!("Left"));
        doc.set_field("type", json!("type:cell"));
        doc.set_field("width", json!(2));
        assert_eq!(doc.name.as_deref(), Some("Left"));
        assert_eq!(doc.doc_type, Some(DocId::type_id("cell")));
        assert_eq!(doc.field("width"), Some(&json!(2)));
        assert!(!doc.fields.contains_key("name"));
    }

    #[test]
    fn meta_touch_bumps_version() {
        let at = Utc::now();
        let mut meta = Meta::new(Origin::Direct, at);
        assert_eq!(meta.version, 1);
        meta.touch(at);
        assert_eq!(meta.version, 2);
    }

    #[test]
    fn transient_flag_serializes_only_when_set() {
        let at = Utc::now();
        let plain = serde_json::to_value(Meta::new(Origin::Template, at)).unwrap();
        assert!(plain.get("transient").is_none());
        let preview = serde_json::to_value(Meta::new(Origin::Template, at).transient()).unwrap();
        assert_eq!(preview["transient"], json!(true));
    }

    #[test]
    fn unknown_origin_is_tolerated() {
        let meta: Meta = serde_json::from_value(json!({
            "origin": "import",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "version": 3
        }))
        .unwrap();
        assert_eq!(meta.origin, Origin::Other);
    }
}
