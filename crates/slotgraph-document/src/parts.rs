//! Composite documents and authored placements
//!
//! A composite lists its components as
//! `parts: [{ "ref": <id>, "location": "x y z rx ry rz" }]`.

use crate::document::Document;
use crate::geometry::Location;
use crate::id::DocId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One component of a composite document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRef {
    /// Document the part places
    #[serde(rename = "ref", alias = "id")]
    pub reference: DocId,
    /// Placement relative to the composite
    #[serde(default)]
    pub location: Location,
}

impl PartRef {
    #[inline]
    #[must_use]
    pub fn new(reference: impl Into<DocId>, location: Location) -> Self {
        Self {
            reference: reference.into(),
            location,
        }
    }
}

impl Document {
    /// True when the document declares at least one well-formed part
    #[must_use]
    pub fn is_composite(&self) -> bool {
        !self.parts().is_empty()
    }

    /// Declared parts, skipping malformed entries
    #[must_use]
    pub fn parts(&self) -> Vec<PartRef> {
        let Some(Value::Array(items)) = self.field("parts") else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| match serde_json::from_value::<PartRef>(raw.clone()) {
                Ok(part) => Some(part),
                Err(err) => {
                    tracing::warn!(doc = %self.id, index, "skipping malformed part: {err}");
                    None
                }
            })
            .collect()
    }

    /// Own placement from the `location` field
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        let raw = self.field("location")?.as_str()?;
        match raw.parse() {
            Ok(location) => Some(location),
            Err(err) => {
                tracing::warn!(doc = %self.id, "ignoring malformed location: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use serde_json::json;

    #[test]
    fn parses_parts_with_ref_and_id_alias() {
        let doc = Document::new("type:shelf").with_field(
            "parts",
            json!([
                { "ref": "type:board", "location": "0 1 0 0 0 0" },
                { "id": "type:board" }
            ]),
        );
        let parts = doc.parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].location.offset, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(parts[1], PartRef::new("type:board", Location::ORIGIN));
        assert!(doc.is_composite());
    }

    #[test]
    fn skips_malformed_parts() {
        let doc = Document::new("type:shelf").with_field(
            "parts",
            json!([{ "location": "0 0 0" }, { "ref": "type:board", "location": "x" }, { "ref": "type:ok" }]),
        );
        let parts = doc.parts();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].reference, DocId::type_id("ok"));
    }

    #[test]
    fn only_malformed_parts_is_not_composite() {
        let doc = Document::new("type:shelf").with_field("parts", json!([{ "location": "0 0 0" }, 7]));
        assert!(!doc.is_composite());
    }

    #[test]
    fn empty_parts_is_not_composite() {
        let doc = Document::new("type:x").with_field("parts", json!([]));
        assert!(!doc.is_composite());
        assert!(!Document::new("type:y").is_composite());
    }

    #[test]
    fn reads_own_location() {
        let doc = Document::new("inst:x").with_field("location", json!("1 2 3 0 0 0"));
        assert_eq!(doc.location().unwrap().offset, Vec3::new(1.0, 2.0, 3.0));
        let bad = Document::new("inst:y").with_field("location", json!("nope"));
        assert!(bad.location().is_none());
    }
}
