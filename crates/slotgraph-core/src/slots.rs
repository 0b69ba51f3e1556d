//! Effective slot merging
//!
//! Overlays the slot declarations of every chain member, base to derived.
//! Within a kind, a slot redeclared by a more specific type replaces the
//! inherited definition wholesale; no field-level merge takes place.

use crate::graph::ObjectGraph;
use indexmap::IndexMap;
use slotgraph_document::{DocId, Document, SlotDef, SlotPath, SlotTable};
use slotgraph_store::DocumentStore;

/// Slot table resolved over a whole type chain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveSlots {
    by_kind: IndexMap<String, SlotTable>,
}

impl EffectiveSlots {
    /// Merge the slot groups of `chain`, ordered base first
    #[must_use]
    pub fn merge<'a>(chain: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut by_kind: IndexMap<String, SlotTable> = IndexMap::new();
        for member in chain {
            for (kind, table) in member.slot_groups() {
                let merged = by_kind.entry(kind).or_default();
                for (name, def) in table {
                    merged.insert(name, def);
                }
            }
        }
        Self { by_kind }
    }

    /// Kind-grouped view
    #[inline]
    #[must_use]
    pub fn by_kind(&self) -> &IndexMap<String, SlotTable> {
        &self.by_kind
    }

    /// Path-keyed view (`kind.slotName`)
    #[must_use]
    pub fn by_path(&self) -> IndexMap<SlotPath, SlotDef> {
        self.iter().map(|(path, def)| (path, def.clone())).collect()
    }

    /// Iterate `(path, definition)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (SlotPath, &SlotDef)> + '_ {
        self.by_kind.iter().flat_map(|(kind, table)| {
            table
                .iter()
                .map(move |(name, def)| (SlotPath::slot(kind.as_str(), name.as_str()), def))
        })
    }

    /// Definition at a two-segment slot path
    #[must_use]
    pub fn get(&self, path: &SlotPath) -> Option<&SlotDef> {
        match path.segments() {
            [kind, name] => self.by_kind.get(kind)?.get(name),
            _ => None,
        }
    }

    /// Declared kinds
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.by_kind.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_kind.values().map(IndexMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl serde::Serialize for EffectiveSlots {
    fn serialize<Se: serde::Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        self.by_kind.serialize(serializer)
    }
}

impl<S: DocumentStore> ObjectGraph<S> {
    /// Effective slots of a type, inherited declarations included
    ///
    /// An unresolvable type yields an empty table.
    pub async fn effective_slots(&self, type_id: &DocId) -> EffectiveSlots {
        let chain = self.resolve_chain(type_id).await;
        let slots = EffectiveSlots::merge(chain.members());
        tracing::debug!(%type_id, chain = chain.len(), slots = slots.len(), "resolved effective slots");
        slots
    }

    /// Effective slots of the type an instance was built from
    pub(crate) async fn slots_of(&self, doc: &Document) -> EffectiveSlots {
        match &doc.doc_type {
            Some(type_id) => self.effective_slots(type_id).await,
            None => EffectiveSlots::default(),
        }
    }
}
