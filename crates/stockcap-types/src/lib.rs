//! Shared type definitions for stockpile capacity accounting.
//!
//! Every crate in the workspace speaks in these types. The ones the
//! configuration UI consumes are exported to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the [`ResourceKind`] identity
//! - [`enums`] -- Job kinds, storage owner kinds, capacity query modes
//! - [`structs`] -- Cells, item stacks, work items, limit entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CapacityMode, JobKind, StorageKind};
pub use ids::{AgentId, ItemId, LocationId, PolicyId, ResourceKind, WorkItemId};
pub use structs::{Cell, ItemStack, LimitEntry, WorkItem};
