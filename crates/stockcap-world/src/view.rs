//! Read-only views over the collaborators capacity decisions depend on.
//!
//! Both traits are pure reads. Implementations must tolerate lookups for
//! things that no longer exist: a cell outside storage, a location that was
//! removed, a policy that was destroyed. Those resolve to `None` or an
//! empty slice, never a panic.

use stockcap_types::{Cell, ItemStack, LocationId, PolicyId};

use crate::agent::AgentWork;

/// Storage collaborator: where storage is and what it holds.
pub trait StorageView {
    /// The storage location covering `cell`, if any.
    fn location_at(&self, cell: Cell) -> Option<LocationId>;

    /// The live storage policy governing `location`.
    ///
    /// `None` when the location is unknown or its policy has been
    /// destroyed.
    fn policy_of(&self, location: LocationId) -> Option<PolicyId>;

    /// Every item stack physically held at `location`.
    fn held_items(&self, location: LocationId) -> &[ItemStack];
}

/// Agent and work-queue collaborator.
pub trait WorkView {
    /// Every agent's current and queued work.
    fn agents(&self) -> impl Iterator<Item = &AgentWork>;
}
