//! slotgraph document model
//!
//! Schema-less documents addressed by namespaced ids, with typed views for
//! the parts the engine reads.
//!
//! # Core Concepts
//!
//! - [`DocId`] / [`Namespace`]: ids whose `type:` / `inst:` prefix fixes how they resolve
//! - [`Document`]: typed known fields plus an open extension bag
//! - [`SlotPath`]: dotted `kind.slotName` address of a slot value
//! - [`SlotDef`] / [`Template`]: slot declarations parsed from type documents
//! - [`ModelSpec`] / [`ModelDescriptor`]: partial and resolved model attachments
//! - [`Location`]: six-value offset/rotation placements and their composition
//!
//! # Example
//!
//! ```rust
//! use slotgraph_document::{DocId, Document, SlotPath};
//! use serde_json::json;
//!
//! let frame: SlotPath = "children.frame".parse().unwrap();
//! let door = Document::new(DocId::instance_id("door"))
//!     .with_type(DocId::type_id("door"))
//!     .with_path(&frame, json!("inst:door_frame_0"));
//!
//! assert_eq!(door.child_ids_at(&frame), vec![DocId::instance_id("door_frame_0")]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod geometry;
mod id;
mod parts;
mod path;
mod schema;

pub use document::{Document, DocumentError, Meta, Origin};
pub use geometry::{Location, LocationError, ModelDescriptor, TransformComposition, Vec3};
pub use id::{DocId, Namespace, INSTANCE_PREFIX, TYPE_PREFIX};
pub use parts::PartRef;
pub use path::{PathError, SlotPath};
pub use schema::{ModelSpec, SlotDef, SlotTable, Template};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
