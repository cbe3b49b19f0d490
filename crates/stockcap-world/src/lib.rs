//! The world the capacity subsystem reads: storage locations, agents, and
//! their work queues.
//!
//! Capacity decisions never own any of this state. They see it through two
//! read-only traits, [`StorageView`] and [`WorkView`], so a host can plug in
//! its own storage and job systems. [`World`] is the in-memory
//! implementation used by the simulation driver and the tests.
//!
//! # Modules
//!
//! - [`agent`] -- [`AgentWork`]: an agent's active work item and queue.
//! - [`error`] -- Error types for world mutations.
//! - [`location`] -- [`StorageLocation`]: a group of cells holding items
//!   under one storage policy.
//! - [`view`] -- The read-only collaborator traits.
//! - [`world`] -- [`World`]: policies, locations, agents and loose items.

pub mod agent;
pub mod error;
pub mod location;
pub mod view;
pub mod world;

// Re-export primary types at crate root.
pub use agent::AgentWork;
pub use error::WorldError;
pub use location::StorageLocation;
pub use view::{StorageView, WorkView};
pub use world::World;
