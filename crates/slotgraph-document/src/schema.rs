//! Typed views over type documents
//!
//! Type documents declare slots as
//! `slots: { <kind>: { slots: { <slotName>: SlotDef } } }` and may attach a
//! partial [`ModelSpec`]. Both are parsed on demand; malformed entries are
//! dropped with a warning so one bad declaration never hides the rest.

use crate::document::Document;
use crate::geometry::Vec3;
use crate::id::DocId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default fields copied into auto-created slot children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Template {
    /// One entry per child (array slots)
    Many(Vec<Map<String, Value>>),
    /// A single object (scalar slots, or repeated for array slots)
    One(Map<String, Value>),
}

/// Declaration of one slot on a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDef {
    /// Type required of anything filling the slot
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub slot_type: Option<DocId>,
    /// Sequence-valued when true
    #[serde(default)]
    pub array: bool,
    /// Must be filled for the instance to validate
    #[serde(default)]
    pub required: bool,
    /// Defaults for auto-created children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
}

impl SlotDef {
    /// Slot accepting instances of `slot_type`
    #[inline]
    #[must_use]
    pub fn new(slot_type: impl Into<DocId>) -> Self {
        Self {
            slot_type: Some(slot_type.into()),
            array: false,
            required: false,
            template: None,
        }
    }

    /// Mark as array-valued
    #[inline]
    #[must_use]
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// With template
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }
}

/// Slot declarations of one kind, by slot name
pub type SlotTable = IndexMap<String, SlotDef>;

/// Partial model attachment declared on a type or instance
///
/// Every field is optional; more specific layers override only the fields
/// they declare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Asset reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Vec3>,
    /// Local rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    /// Local scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
}

/// Names usable as one slot path segment
fn is_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains('.')
}

impl Document {
    /// Slot declarations grouped by kind, in authored order
    #[must_use]
    pub fn slot_groups(&self) -> IndexMap<String, SlotTable> {
        let mut groups = IndexMap::new();
        let Some(Value::Object(kinds)) = self.field("slots") else {
            return groups;
        };

        for (kind, group) in kinds {
            if !is_segment(kind) {
                tracing::warn!(doc = %self.id, kind = %kind, "ignoring slot kind that is not a path segment");
                continue;
            }
            let Some(Value::Object(slots)) = group.get("slots") else {
                tracing::warn!(doc = %self.id, kind = %kind, "slot group has no slot table");
                continue;
            };
            let mut table = SlotTable::new();
            for (name, raw) in slots {
                if !is_segment(name) {
                    tracing::warn!(doc = %self.id, slot = %name, "ignoring slot name that is not a path segment");
                    continue;
                }
                match serde_json::from_value::<SlotDef>(raw.clone()) {
                    Ok(def) => {
                        table.insert(name.clone(), def);
                    }
                    Err(err) => {
                        tracing::warn!(doc = %self.id, slot = %name, "ignoring malformed slot: {err}");
                    }
                }
            }
            groups.insert(kind.clone(), table);
        }
        groups
    }

    /// Declare a slot on this (type) document
    pub fn declare_slot(&mut self, kind: &str, name: &str, def: &SlotDef) {
        let value = serde_json::to_value(def).unwrap_or(Value::Null);
        let path = crate::path::SlotPath::from_segments(vec![
            "slots".to_string(),
            kind.to_string(),
            "slots".to_string(),
            name.to_string(),
        ]);
        self.set_path(&path, value);
    }

    /// Model declared directly on this document
    #[must_use]
    pub fn model_spec(&self) -> Option<ModelSpec> {
        let raw = self.field("model")?;
        match serde_json::from_value(raw.clone()) {
            Ok(spec) => Some(spec),
            Err(err) => {
                tracing::warn!(doc = %self.id, "ignoring malformed model: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_slot_groups_in_order() {
        let doc = Document::from_value(json!({
            "id": "type:door",
            "slots": {
                "children": { "slots": {
                    "frame": { "type": "type:frame", "required": true },
                    "panels": { "type": "type:panel", "array": true, "template": [{ "name": "L" }] }
                }},
                "attachments": { "slots": { "handle": { "type": "type:handle" } } }
            }
        }))
        .unwrap();

        let groups = doc.slot_groups();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["children", "attachments"]);
        let children = &groups["children"];
        assert!(children["frame"].required);
        assert!(!children["frame"].array);
        assert!(children["panels"].array);
        assert!(matches!(children["panels"].template, Some(Template::Many(ref t)) if t.len() == 1));
    }

    #[test]
    fn malformed_slot_is_dropped_not_fatal() {
        let doc = Document::from_value(json!({
            "id": "type:x",
            "slots": { "children": { "slots": {
                "good": { "type": "type:a" },
                "bad": { "array": "yes" }
            }}}
        }))
        .unwrap();
        let groups = doc.slot_groups();
        assert!(groups["children"].contains_key("good"));
        assert!(!groups["children"].contains_key("bad"));
    }

    #[test]
    fn slot_names_must_fit_one_segment() {
        let doc = Document::from_value(json!({
            "id": "type:x",
            "slots": {
                "children": { "slots": {
                    "top panel": { "type": "type:a" },
                    "a.b": { "type": "type:a" }
                }},
                "odd.kind": { "slots": { "c": { "type": "type:a" } } }
            }
        }))
        .unwrap();
        let groups = doc.slot_groups();
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["children"]);
        assert_eq!(groups["children"].keys().collect::<Vec<_>>(), vec!["top panel"]);
    }

    #[test]
    fn no_slots_field_yields_empty() {
        assert!(Document::new("type:x").slot_groups().is_empty());
    }

    #[test]
    fn scalar_template_is_one() {
        let def: SlotDef = serde_json::from_value(json!({
            "type": "type:frame",
            "template": { "name": "Frame" }
        }))
        .unwrap();
        assert!(matches!(def.template, Some(Template::One(_))));
    }

    #[test]
    fn declare_slot_round_trips() {
        let mut doc = Document::new("type:door");
        doc.declare_slot("children", "frame", &SlotDef::new("type:frame").required());
        let groups = doc.slot_groups();
        assert_eq!(groups["children"]["frame"], SlotDef::new("type:frame").required());
    }

    #[test]
    fn model_spec_accepts_partial_fields() {
        let doc = Document::new("type:x").with_field("model", json!({ "url": "door.glb" }));
        let spec = doc.model_spec().unwrap();
        assert_eq!(spec.url.as_deref(), Some("door.glb"));
        assert!(spec.offset.is_none());
    }
}
