//! slotgraph engine
//!
//! Schema-on-read object graph over a document store: reusable types,
//! template-driven instances, and parent back-references kept consistent as
//! the graph is edited.
//!
//! # Components
//!
//! - **Type Chain Resolver** ([`ObjectGraph::type_chain`]): depth-bounded, cycle-safe ancestry
//! - **Effective Slot Merger** ([`ObjectGraph::effective_slots`]): last-writer-wins by slot name
//! - **Instantiator** ([`instantiate_slot`], [`ObjectGraph::create_instance_from_type`])
//! - **Parent-Link Maintainer** ([`ObjectGraph::put_instance`])
//! - **Consistency Auditor** ([`ObjectGraph::validate_parent_links`], [`ObjectGraph::repair_parent_links`])
//! - **Model Attachment Resolver** ([`ObjectGraph::effective_model`], [`ObjectGraph::expand_children`])
//!
//! # Example
//!
//! ```rust
//! use slotgraph_core::ObjectGraph;
//! use slotgraph_document::{DocId, Document, SlotDef};
//! use slotgraph_store::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut door = Document::new(DocId::type_id("door")).with_name("Door");
//! door.declare_slot("children", "frame", &SlotDef::new("type:frame").required());
//! let graph = ObjectGraph::new(MemoryStore::with_documents(vec![door]));
//!
//! let slots = graph.effective_slots(&DocId::type_id("door")).await;
//! assert_eq!(slots.len(), 1);
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod assembly;
mod attach;
mod audit;
mod chain;
mod config;
mod error;
mod graph;
mod instantiate;
mod links;
mod slots;
mod validate;

pub use assembly::Placement;
pub use audit::{LinkIssue, LinkIssueKind, RepairStats};
pub use chain::TypeChain;
pub use config::GraphConfig;
pub use error::{ConfigError, GraphError, GraphResult};
pub use graph::ObjectGraph;
pub use instantiate::{
    instantiate_slot, InstanceTree, InstantiateOptions, InstantiationMode, PreviewTree, Stamp,
};
pub use slots::EffectiveSlots;
pub use validate::{ValidationEntry, ValidationKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
