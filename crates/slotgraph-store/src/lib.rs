//! slotgraph store layer
//!
//! The boundary between the engine and document persistence.
//!
//! # Core Operations
//!
//! - [`DocumentStore`]: async get/put/delete/list contract consumed by the engine
//! - [`MemoryStore`]: in-memory implementation, ordered by id
//! - [`CachedStore`]: read-through moka cache over any store
//! - [`reset_store`] / [`load_seed_file`]: reload a seed set
//!
//! # Architecture
//!
//! ```text
//! ObjectGraph → CachedStore (optional) → DocumentStore backend
//!                                              ↑
//!                         seed file → reset_store
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod memory;
pub mod seed;
pub mod store;

// Re-exports for convenience
pub use cache::{CacheStats, CachedStore};
pub use error::{SeedError, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use seed::{load_seed_file, parse_seed, reset_store, ResetStats};
pub use store::{DocHeader, DocumentStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
