//! Enumeration types for capacity accounting.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Job kinds
// ---------------------------------------------------------------------------

/// What an agent's work item does with the stack it moves.
///
/// Only [`JobKind::HaulToStorage`] is a commitment to fill a storage
/// location; everything else moves items somewhere the capacity limits do
/// not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum JobKind {
    /// Carry a stack into a storage location.
    HaulToStorage,
    /// Carry a stack to a plain map cell (not storage).
    HaulToCell,
    /// Pick up an item to wear or wield.
    Equip,
    /// Carry a stack to a consumer such as a construction site.
    Deliver,
}

impl JobKind {
    /// Whether this job reserves space in its destination storage.
    pub const fn reserves_storage(self) -> bool {
        matches!(self, Self::HaulToStorage)
    }
}

// ---------------------------------------------------------------------------
// Storage kinds
// ---------------------------------------------------------------------------

/// The kind of object that owns a storage policy.
///
/// Resource-kind filters are also used by things that consume resources
/// (a workbench bill's ingredient list, for example). Those are not
/// bounded storage and never carry quantity limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum StorageKind {
    /// A zone of floor cells.
    Stockpile,
    /// A storage building occupying one or more cells.
    Shelf,
    /// A non-storage consumer of the resource-kind filter.
    Consumer,
}

impl StorageKind {
    /// Whether quantity limits may be configured for this owner.
    pub const fn is_bounded_storage(self) -> bool {
        matches!(self, Self::Stockpile | Self::Shelf)
    }
}

// ---------------------------------------------------------------------------
// Capacity mode
// ---------------------------------------------------------------------------

/// Which commitments a capacity query subtracts from the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CapacityMode {
    /// Only what is physically present right now.
    PhysicalOnly,
    /// Physically present plus every other agent's pending hauls.
    IncludingReservations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_hauls_reserve() {
        assert!(JobKind::HaulToStorage.reserves_storage());
        assert!(!JobKind::HaulToCell.reserves_storage());
        assert!(!JobKind::Equip.reserves_storage());
        assert!(!JobKind::Deliver.reserves_storage());
    }

    #[test]
    fn consumers_are_not_bounded_storage() {
        assert!(StorageKind::Stockpile.is_bounded_storage());
        assert!(StorageKind::Shelf.is_bounded_storage());
        assert!(!StorageKind::Consumer.is_bounded_storage());
    }
}
