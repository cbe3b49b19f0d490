//! Physically present quantities at a storage location.
//!
//! A single pass groups every held stack by kind. Callers asking about one
//! kind use [`count_present`]; callers that need several kinds for the same
//! location take an [`OccupancySnapshot`] once and read from it.

use std::collections::BTreeMap;

use stockcap_types::{LocationId, ResourceKind};
use stockcap_world::StorageView;

/// Per-kind totals of what a location holds right now.
///
/// Valid only for the step it was taken in; held contents change every
/// step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancySnapshot {
    counts: BTreeMap<ResourceKind, u32>,
}

impl OccupancySnapshot {
    /// Group everything held at `location` by kind.
    ///
    /// An unknown or empty location yields an empty snapshot.
    pub fn take<S: StorageView>(storage: &S, location: LocationId) -> Self {
        let mut counts: BTreeMap<ResourceKind, u32> = BTreeMap::new();
        for stack in storage.held_items(location) {
            let total = counts.entry(stack.kind.clone()).or_insert(0);
            *total = total.saturating_add(stack.count);
        }
        Self { counts }
    }

    /// Units of `kind` present. Zero if none.
    pub fn count(&self, kind: &ResourceKind) -> u32 {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    /// Every kind present with its total.
    pub const fn by_kind(&self) -> &BTreeMap<ResourceKind, u32> {
        &self.counts
    }
}

/// Units of `kind` physically held at `location`.
pub fn count_present<S: StorageView>(storage: &S, location: LocationId, kind: &ResourceKind) -> u32 {
    OccupancySnapshot::take(storage, location).count(kind)
}
