//! Template-driven instantiation
//!
//! # Responsibility
//!
//! Synthesizes child instance documents for a slot from its template, and
//! builds a whole instance from a type with one instantiation pass per
//! templated slot.
//!
//! # Core Concepts
//!
//! - **Cardinality**: derived from `array`, the template shape and an optional count
//! - **Deterministic ids**: `<parent>_<leaf slot>_<index>`
//! - **Modes**: [`InstantiationMode::Persist`] writes through the store,
//!   [`InstantiationMode::Preview`] returns a [`PreviewTree`] that has no
//!   route back into it

use crate::error::{GraphError, GraphResult};
use crate::graph::ObjectGraph;
use crate::slots::EffectiveSlots;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use slotgraph_document::{DocId, Document, Meta, Origin, SlotDef, SlotPath, Template};
use slotgraph_store::DocumentStore;

/// Time and persistence flag applied to constructed documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub at: DateTime<Utc>,
    pub transient: bool,
}

impl Stamp {
    /// Stamp for documents headed to the store
    #[inline]
    #[must_use]
    pub fn persisted(at: DateTime<Utc>) -> Self {
        Self { at, transient: false }
    }

    /// Stamp for preview documents
    #[inline]
    #[must_use]
    pub fn preview(at: DateTime<Utc>) -> Self {
        Self { at, transient: true }
    }

    /// Fresh metadata carrying this stamp
    #[must_use]
    pub fn meta(self, origin: Origin) -> Meta {
        let meta = Meta::new(origin, self.at);
        if self.transient {
            meta.transient()
        } else {
            meta
        }
    }
}

/// Whether constructed documents reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstantiationMode {
    #[default]
    Persist,
    Preview,
}

/// Options for [`ObjectGraph::create_instance_from_type`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstantiateOptions {
    pub mode: InstantiationMode,
}

impl InstantiateOptions {
    #[inline]
    #[must_use]
    pub fn persist() -> Self {
        Self {
            mode: InstantiationMode::Persist,
        }
    }

    #[inline]
    #[must_use]
    pub fn preview() -> Self {
        Self {
            mode: InstantiationMode::Preview,
        }
    }
}

/// Documents built for a preview; read access only
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTree {
    root: Document,
    children: Vec<Document>,
}

impl PreviewTree {
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Document {
        &self.root
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Document] {
        &self.children
    }

    /// Root followed by every child
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        std::iter::once(&self.root).chain(self.children.iter())
    }

    /// Look up a constructed document by id
    #[must_use]
    pub fn get(&self, id: &DocId) -> Option<&Document> {
        self.documents().find(|doc| &doc.id == id)
    }
}

/// Result of instantiating a type
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceTree {
    /// Written to the store; `root` is the stored version
    Persisted { root: Document, children: Vec<Document> },
    /// Never written
    Preview(PreviewTree),
}

impl InstanceTree {
    #[must_use]
    pub fn root(&self) -> &Document {
        match self {
            Self::Persisted { root, .. } => root,
            Self::Preview(tree) => tree.root(),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Document] {
        match self {
            Self::Persisted { children, .. } => children,
            Self::Preview(tree) => tree.children(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview(_))
    }
}

/// Construct the children a slot's template describes, without storing them
///
/// Cardinality:
/// - array, no template: `count` (default 0) empty children
/// - array, single template: `count` (default 1) copies
/// - array, template sequence: one child per entry, `count` ignored
/// - scalar: exactly one child
#[must_use]
pub fn instantiate_slot(
    parent: &DocId,
    path: &SlotPath,
    def: &SlotDef,
    count: Option<usize>,
    stamp: Stamp,
) -> Vec<Document> {
    build_children(parent, path, def, count, stamp, 0)
}

fn build_children(
    parent: &DocId,
    path: &SlotPath,
    def: &SlotDef,
    count: Option<usize>,
    stamp: Stamp,
    first_index: usize,
) -> Vec<Document> {
    let Some(leaf) = path.leaf() else {
        tracing::warn!(%parent, "cannot instantiate at an empty slot path");
        return Vec::new();
    };

    let templates: Vec<Option<&Map<String, Value>>> = match (def.array, &def.template) {
        (true, None) => vec![None; count.unwrap_or(0)],
        (true, Some(Template::One(template))) => vec![Some(template); count.unwrap_or(1)],
        (true, Some(Template::Many(entries))) => entries.iter().map(Some).collect(),
        (false, None) => vec![None],
        (false, Some(Template::One(template))) => vec![Some(template)],
        (false, Some(Template::Many(entries))) => vec![entries.first()],
    };

    templates
        .into_iter()
        .enumerate()
        .map(|(offset, template)| {
            let mut child = Document::default();
            if let Some(template) = template {
                child.merge_object(template);
            }
            child.id = DocId::child_of(parent, leaf, first_index + offset);
            if child.doc_type.is_none() {
                child.doc_type = def.slot_type.clone();
            }
            child.set_parent_link(Some((parent.clone(), path)));
            child.meta = Some(stamp.meta(Origin::Template));
            child
        })
        .collect()
}

fn record_children(doc: &mut Document, path: &SlotPath, def: &SlotDef, children: &[Document]) {
    let ids = children.iter().map(|child| Value::String(child.id.to_string()));
    if def.array {
        let mut existing = match doc.get_path(path) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        existing.extend(ids);
        doc.set_path(path, Value::Array(existing));
    } else if let Some(id) = ids.last() {
        doc.set_path(path, id);
    }
}

/// Index after every synthesized id already held by an array slot
///
/// Never below the slot's length, so removed entries are not reused.
fn next_index(parent: &Document, path: &SlotPath) -> usize {
    let Some(leaf) = path.leaf() else {
        return 0;
    };
    let prefix = format!("{}_{leaf}_", parent.id);
    let items: &[Value] = match parent.get_path(path) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|raw| raw.strip_prefix(prefix.as_str()))
        .filter_map(|suffix| suffix.parse::<usize>().ok())
        .map(|index| index + 1)
        .fold(items.len(), usize::max)
}

impl<S: DocumentStore> ObjectGraph<S> {
    /// Instantiate a slot of a stored instance and record the new children
    ///
    /// Array slots gain the children after any existing entries; scalar slots
    /// are overwritten. New ids continue after the highest index the slot
    /// already holds and skip ids that are already stored. The parent is rewritten through
    /// [`put_instance`](Self::put_instance).
    ///
    /// # Errors
    /// - `GraphError::NotFound` if the parent does not exist
    /// - `GraphError::TransientWrite` if the parent is a preview document
    /// - `GraphError::Store` if a write fails
    pub async fn instantiate_slot_persisted(
        &self,
        parent_id: &DocId,
        path: &SlotPath,
        def: &SlotDef,
        count: Option<usize>,
    ) -> GraphResult<Vec<Document>> {
        let mut parent = self
            .fetch(parent_id)
            .await
            .ok_or_else(|| GraphError::NotFound(parent_id.clone()))?;
        if parent.is_transient() {
            return Err(GraphError::TransientWrite(parent.id));
        }

        let stamp = Stamp::persisted(Utc::now());
        let mut first_index = if def.array { next_index(&parent, path) } else { 0 };
        let children = loop {
            let built = build_children(parent_id, path, def, count, stamp, first_index);
            match self.first_taken(&built).await {
                Some(offset) => first_index += offset + 1,
                None => break built,
            }
        };
        for child in &children {
            self.store().put_doc(child).await?;
        }

        record_children(&mut parent, path, def, &children);
        self.put_instance(parent).await?;
        tracing::debug!(parent = %parent_id, %path, created = children.len(), "instantiated slot");
        Ok(children)
    }

    /// Position of the first document in `built` whose id is already stored
    async fn first_taken(&self, built: &[Document]) -> Option<usize> {
        for (offset, child) in built.iter().enumerate() {
            if self.fetch(&child.id).await.is_some() {
                tracing::debug!(id = %child.id, "child id taken, moving past it");
                return Some(offset);
            }
        }
        None
    }

    /// Build an instance of `type_id`, auto-creating children for templated slots
    ///
    /// The root starts from the type's name, then `overrides` are applied on
    /// top; `id` always wins. A slot the overrides already fill is left
    /// alone. Only one level is instantiated.
    ///
    /// # Errors
    /// - `GraphError::MissingId` if `id` is empty
    /// - `GraphError::Store` if a write fails (persist mode)
    pub async fn create_instance_from_type(
        &self,
        id: DocId,
        type_id: &DocId,
        overrides: Map<String, Value>,
        options: InstantiateOptions,
    ) -> GraphResult<InstanceTree> {
        if id.is_empty() {
            return Err(GraphError::MissingId);
        }
        let stamp = match options.mode {
            InstantiationMode::Persist => Stamp::persisted(Utc::now()),
            InstantiationMode::Preview => Stamp::preview(Utc::now()),
        };

        let chain = self.resolve_chain(type_id).await;
        if chain.is_empty() {
            tracing::warn!(%type_id, %id, "instantiating unresolved type");
        }
        let slots = EffectiveSlots::merge(chain.members());

        let mut root = Document::new(id.clone()).with_type(type_id.clone());
        root.name = chain.most_specific().and_then(|t| t.name.clone());
        root.merge_object(&overrides);
        root.id = id;

        let mut children = Vec::new();
        for (path, def) in slots.iter() {
            if def.template.is_none() || root.get_path(&path).is_some() {
                continue;
            }
            let built = build_children(&root.id, &path, def, None, stamp, 0);
            record_children(&mut root, &path, def, &built);
            children.extend(built);
        }

        match options.mode {
            InstantiationMode::Preview => {
                root.meta = Some(stamp.meta(Origin::Direct));
                tracing::debug!(id = %root.id, children = children.len(), "built preview instance");
                Ok(InstanceTree::Preview(PreviewTree { root, children }))
            }
            InstantiationMode::Persist => {
                for child in &children {
                    self.store().put_doc(child).await?;
                }
                root.meta = None;
                let root = self.put_instance(root).await?;
                tracing::info!(id = %root.id, %type_id, children = children.len(), "created instance");
                Ok(InstanceTree::Persisted { root, children })
            }
        }
    }
}
