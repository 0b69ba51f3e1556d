//! Document identifiers and id namespaces
//!
//! Provides [`DocId`], the globally unique key of every stored document, and
//! [`Namespace`], derived from the id's fixed scheme prefix.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Prefix carried by every type id
pub const TYPE_PREFIX: &str = "type:";

/// Prefix carried by every instance id
pub const INSTANCE_PREFIX: &str = "inst:";

/// Namespace an id belongs to
///
/// The namespace alone decides how an id resolves: type ids walk the
/// type chain, instance ids walk the instance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Reusable template documents
    Type,
    /// Concrete documents built from a type
    Instance,
}

impl Namespace {
    /// Scheme prefix for this namespace
    #[inline]
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Type => TYPE_PREFIX,
            Self::Instance => INSTANCE_PREFIX,
        }
    }
}

/// Globally unique document id
///
/// Ordered so whole-store passes can iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    /// Wrap a raw id string
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build a type id from a bare name (`"frame"` → `"type:frame"`)
    #[inline]
    #[must_use]
    pub fn type_id(name: &str) -> Self {
        Self(format!("{TYPE_PREFIX}{name}"))
    }

    /// Build an instance id from a bare name (`"door"` → `"inst:door"`)
    #[inline]
    #[must_use]
    pub fn instance_id(name: &str) -> Self {
        Self(format!("{INSTANCE_PREFIX}{name}"))
    }

    /// Mint a fresh random instance id
    #[must_use]
    pub fn new_instance() -> Self {
        Self::instance_id(&Uuid::new_v4().to_string())
    }

    /// Raw id string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty (structurally invalid)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Namespace fixed by the id prefix, if any
    #[must_use]
    pub fn namespace(&self) -> Option<Namespace> {
        if self.0.len() > TYPE_PREFIX.len() && self.0.starts_with(TYPE_PREFIX) {
            Some(Namespace::Type)
        } else if self.0.len() > INSTANCE_PREFIX.len() && self.0.starts_with(INSTANCE_PREFIX) {
            Some(Namespace::Instance)
        } else {
            None
        }
    }

    /// Check for the type namespace
    #[inline]
    #[must_use]
    pub fn is_type(&self) -> bool {
        self.namespace() == Some(Namespace::Type)
    }

    /// Check for the instance namespace
    #[inline]
    #[must_use]
    pub fn is_instance(&self) -> bool {
        self.namespace() == Some(Namespace::Instance)
    }

    /// Deterministic id for the `index`-th child created in `slot` of `parent`
    #[must_use]
    pub fn child_of(parent: &DocId, slot: &str, index: usize) -> Self {
        Self(format!("{}_{slot}_{index}", parent.0))
    }
}

impl Display for DocId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_from_prefix() {
        assert_eq!(DocId::type_id("frame").namespace(), Some(Namespace::Type));
        assert_eq!(DocId::instance_id("a").namespace(), Some(Namespace::Instance));
        assert_eq!(DocId::new("frame").namespace(), None);
    }

    #[test]
    fn bare_prefix_has_no_namespace() {
        assert_eq!(DocId::new("type:").namespace(), None);
        assert_eq!(DocId::new("inst:").namespace(), None);
    }

    #[test]
    fn child_id_is_deterministic() {
        let parent = DocId::instance_id("root");
        let a = DocId::child_of(&parent, "cells", 1);
        let b = DocId::child_of(&parent, "cells", 1);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "inst:root_cells_1");
        assert!(a.is_instance());
    }

    #[test]
    fn minted_ids_are_instances() {
        let id = DocId::new_instance();
        assert!(id.is_instance());
        assert_ne!(id, DocId::new_instance());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = DocId::type_id("x");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"type:x\"");
    }
}
