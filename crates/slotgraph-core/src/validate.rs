//! Instance validation against effective slots
//!
//! Referential problems are returned as [`ValidationEntry`] values meant for
//! verbatim display; only a missing id is an error.

use crate::error::{GraphError, GraphResult};
use crate::graph::ObjectGraph;
use crate::slots::EffectiveSlots;
use serde::Serialize;
use serde_json::Value;
use slotgraph_document::{DocId, Document, SlotDef};
use slotgraph_store::DocumentStore;
use std::fmt;

/// Kind of validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    UnknownType,
    MissingRequired,
    ShapeMismatch,
    MissingChild,
    WrongNamespace,
    TypeMismatch,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnknownType => "unknown_type",
            Self::MissingRequired => "missing_required",
            Self::ShapeMismatch => "shape_mismatch",
            Self::MissingChild => "missing_child",
            Self::WrongNamespace => "wrong_namespace",
            Self::TypeMismatch => "type_mismatch",
        };
        f.write_str(name)
    }
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationEntry {
    /// Slot path, with `[index]` for sequence entries
    pub field: String,
    pub kind: ValidationKind,
    pub message: String,
}

impl ValidationEntry {
    fn new(field: impl Into<String>, kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(raw)) => raw.is_empty(),
        _ => false,
    }
}

impl<S: DocumentStore> ObjectGraph<S> {
    /// Check an instance's slot values against its type's effective slots
    ///
    /// # Errors
    /// Returns `GraphError::MissingId` if the document has no id
    pub async fn validate_instance(&self, doc: &Document) -> GraphResult<Vec<ValidationEntry>> {
        if doc.id.is_empty() {
            return Err(GraphError::MissingId);
        }
        let mut entries = Vec::new();

        let Some(type_id) = &doc.doc_type else {
            entries.push(ValidationEntry::new("type", ValidationKind::UnknownType, "instance has no type"));
            return Ok(entries);
        };
        let chain = self.resolve_chain(type_id).await;
        if chain.is_empty() {
            entries.push(ValidationEntry::new(
                "type",
                ValidationKind::UnknownType,
                format!("type {type_id} does not resolve"),
            ));
            return Ok(entries);
        }

        let slots = EffectiveSlots::merge(chain.members());
        for (path, def) in slots.iter() {
            let field = path.to_string();
            let value = doc.get_path(&path);

            if is_empty_value(value) {
                if def.required {
                    entries.push(ValidationEntry::new(
                        field,
                        ValidationKind::MissingRequired,
                        "required slot is empty",
                    ));
                }
                continue;
            }

            match value {
                Some(Value::Array(items)) => {
                    if !def.array {
                        entries.push(ValidationEntry::new(
                            field.clone(),
                            ValidationKind::ShapeMismatch,
                            "scalar slot holds a sequence",
                        ));
                    }
                    if def.required && items.is_empty() {
                        entries.push(ValidationEntry::new(
                            field.clone(),
                            ValidationKind::MissingRequired,
                            "required slot is empty",
                        ));
                    }
                    for (index, item) in items.iter().enumerate() {
                        self.check_child(format!("{field}[{index}]"), item, def, &mut entries)
                            .await;
                    }
                }
                Some(item) => {
                    if def.array {
                        entries.push(ValidationEntry::new(
                            field.clone(),
                            ValidationKind::ShapeMismatch,
                            "array slot holds a single value",
                        ));
                    }
                    self.check_child(field, item, def, &mut entries).await;
                }
                None => {}
            }
        }

        tracing::debug!(id = %doc.id, findings = entries.len(), "validated instance");
        Ok(entries)
    }

    async fn check_child(
        &self,
        field: String,
        value: &Value,
        def: &SlotDef,
        entries: &mut Vec<ValidationEntry>,
    ) {
        let id = match value.as_str().map(DocId::from) {
            Some(id) if id.is_instance() => id,
            _ => {
                entries.push(ValidationEntry::new(
                    field,
                    ValidationKind::WrongNamespace,
                    format!("{value} is not an instance id"),
                ));
                return;
            }
        };

        let Some(child) = self.fetch(&id).await else {
            entries.push(ValidationEntry::new(
                field,
                ValidationKind::MissingChild,
                format!("{id} does not exist"),
            ));
            return;
        };

        let Some(expected) = &def.slot_type else {
            return;
        };
        let conforms = match &child.doc_type {
            Some(child_type) => self.resolve_chain(child_type).await.contains(expected),
            None => false,
        };
        if !conforms {
            entries.push(ValidationEntry::new(
                field,
                ValidationKind::TypeMismatch,
                format!("{id} is not a {expected}"),
            ));
        }
    }
}
