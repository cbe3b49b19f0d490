//! Error types for the `stockcap-world` crate.
//!
//! Only world mutations fail. The read-only views return empty results
//! for anything they cannot resolve.

use stockcap_types::{AgentId, Cell, ItemId, LocationId, PolicyId};

/// Errors that can occur while mutating the in-memory world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The storage policy does not exist (never created or destroyed).
    #[error("storage policy not found: {0}")]
    PolicyNotFound(PolicyId),

    /// A policy with this id is already live.
    #[error("storage policy already exists: {0}")]
    PolicyExists(PolicyId),

    /// The storage location does not exist.
    #[error("storage location not found: {0}")]
    LocationNotFound(LocationId),

    /// The agent does not exist.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A loose item stack was not found on the ground.
    #[error("item not found on the ground: {0}")]
    ItemNotFound(ItemId),

    /// A cell already belongs to another storage location.
    #[error("cell {cell:?} already belongs to location {location}")]
    CellTaken {
        /// The contested cell.
        cell: Cell,
        /// The location that owns it.
        location: LocationId,
    },

    /// A storage location must cover at least one cell.
    #[error("storage location {0:?} has no cells")]
    NoCells(String),
}
