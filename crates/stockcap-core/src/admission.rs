//! Admission control: how much more of a resource kind a storage location
//! may accept.
//!
//! Two modes answer two different questions:
//!
//! - [`CapacityMode::IncludingReservations`] -- "if every pending haul
//!   lands, how much room is left?" Used when choosing destinations and
//!   sizing new hauls, so agents do not overcommit a location together.
//! - [`CapacityMode::PhysicalOnly`] -- "is the location full right now?"
//!   Used at the moment of deposit. Reservations have not landed yet, and
//!   one of them may be the depositing agent's own.
//!
//! A location whose policy is unknown, destroyed, or carries no limit for
//! the kind is [`Capacity::Unlimited`].

use std::num::NonZeroU32;

use stockcap_limits::LimitRegistry;
use stockcap_types::{CapacityMode, LocationId, ResourceKind, WorkItemId};
use stockcap_world::{StorageView, WorkView};

use crate::occupancy::count_present;
use crate::reservation::ReservationScanner;

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

/// Remaining room for one resource kind at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// No limit applies; any quantity fits.
    Unlimited,
    /// At most this many more units fit. Never negative.
    Bounded(u32),
}

impl Capacity {
    /// Whether nothing more fits.
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Bounded(0))
    }

    /// The part of `requested` that fits.
    pub fn admit(self, requested: u32) -> u32 {
        match self {
            Self::Unlimited => requested,
            Self::Bounded(room) => requested.min(room),
        }
    }

    /// Whether `quantity` fits entirely.
    pub const fn fits(self, quantity: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Bounded(room) => quantity <= room,
        }
    }
}

// ---------------------------------------------------------------------------
// AdmissionController
// ---------------------------------------------------------------------------

/// Combines configured limits, occupancy and reservations into capacity
/// decisions.
///
/// Holds only borrows; build one per decision step.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionController<'a, S, W> {
    limits: &'a LimitRegistry,
    storage: &'a S,
    work: &'a W,
}

impl<'a, S: StorageView, W: WorkView> AdmissionController<'a, S, W> {
    /// Create a controller over the given registry and world views.
    pub const fn new(limits: &'a LimitRegistry, storage: &'a S, work: &'a W) -> Self {
        Self {
            limits,
            storage,
            work,
        }
    }

    /// The storage view decisions are made against.
    pub const fn storage(&self) -> &'a S {
        self.storage
    }

    /// The limit governing `kind` at `location`, if any.
    pub fn limit(&self, location: LocationId, kind: &ResourceKind) -> Option<NonZeroU32> {
        let policy = self.storage.policy_of(location)?;
        if !self.limits.has_any_limit(policy) {
            return None;
        }
        self.limits.get_limit(policy, kind)
    }

    /// Whether a positive limit is configured for `kind` at `location`.
    pub fn has_limit(&self, location: LocationId, kind: &ResourceKind) -> bool {
        self.limit(location, kind).is_some()
    }

    /// Room left for `kind` at `location` under `mode`.
    ///
    /// `exclude` keeps a work item from being counted against itself; it
    /// only matters for [`CapacityMode::IncludingReservations`].
    pub fn available_capacity(
        &self,
        location: LocationId,
        kind: &ResourceKind,
        mode: CapacityMode,
        exclude: Option<WorkItemId>,
    ) -> Capacity {
        let Some(limit) = self.limit(location, kind) else {
            return Capacity::Unlimited;
        };
        let occupied = count_present(self.storage, location, kind);
        let committed = match mode {
            CapacityMode::PhysicalOnly => occupied,
            CapacityMode::IncludingReservations => {
                let reserved = ReservationScanner::new(self.storage, self.work)
                    .count_reserved(location, kind, exclude);
                occupied.saturating_add(reserved)
            }
        };
        Capacity::Bounded(limit.get().saturating_sub(committed))
    }

    /// Whether `location` can take no more `kind` under `mode`.
    ///
    /// Always `false` when no limit applies.
    pub fn is_full(&self, location: LocationId, kind: &ResourceKind, mode: CapacityMode) -> bool {
        self.available_capacity(location, kind, mode, None)
            .is_exhausted()
    }

    /// The part of `requested` that may head to `location` once every
    /// other pending haul is accounted for.
    pub fn admit(
        &self,
        requested: u32,
        location: LocationId,
        kind: &ResourceKind,
        exclude: Option<WorkItemId>,
    ) -> u32 {
        if requested == 0 {
            return 0;
        }
        self.available_capacity(location, kind, CapacityMode::IncludingReservations, exclude)
            .admit(requested)
    }
}
