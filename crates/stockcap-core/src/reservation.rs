//! Reservations: quantities other agents have committed to deliver to a
//! storage location but have not delivered yet.
//!
//! There is no reservation ledger. Work items are created, cancelled and
//! completed by the job system without telling anyone, so every count is a
//! fresh scan over every agent's active and queued work.
//!
//! A work item counts toward `(location, kind)` when all of these hold:
//!
//! 1. it is a storage haul ([`JobKind::HaulToStorage`]);
//! 2. it moves `kind`;
//! 3. its destination cell resolves to `location`;
//! 4. it is not the excluded item.
//!
//! It contributes the stack count of its haul target, which is what will
//! actually arrive, rather than the nominal requested quantity.
//!
//! [`JobKind::HaulToStorage`]: stockcap_types::JobKind::HaulToStorage

use stockcap_types::{LocationId, ResourceKind, WorkItem, WorkItemId};
use stockcap_world::{StorageView, WorkView};
use tracing::trace;

/// Sums in-flight storage hauls towards a location.
#[derive(Debug, Clone, Copy)]
pub struct ReservationScanner<'a, S, W> {
    storage: &'a S,
    work: &'a W,
}

impl<'a, S: StorageView, W: WorkView> ReservationScanner<'a, S, W> {
    /// Scan `work` for hauls into locations resolved through `storage`.
    pub const fn new(storage: &'a S, work: &'a W) -> Self {
        Self { storage, work }
    }

    /// Units of `kind` committed towards `location`, not counting
    /// `exclude`.
    pub fn count_reserved(
        &self,
        location: LocationId,
        kind: &ResourceKind,
        exclude: Option<WorkItemId>,
    ) -> u32 {
        let mut reserved: u32 = 0;
        for agent in self.work.agents() {
            for item in agent.work_items() {
                if !self.reserves(item, location, kind, exclude) {
                    continue;
                }
                let carried = item.carried_count();
                trace!(
                    agent = %agent.id,
                    work_item = %item.id,
                    carried,
                    requested = item.requested,
                    "pending haul reserves space"
                );
                reserved = reserved.saturating_add(carried);
            }
        }
        reserved
    }

    /// Whether `item` is a haul of `kind` into `location`.
    fn reserves(
        &self,
        item: &WorkItem,
        location: LocationId,
        kind: &ResourceKind,
        exclude: Option<WorkItemId>,
    ) -> bool {
        if !item.job.reserves_storage() || &item.kind != kind {
            return false;
        }
        if exclude.is_some_and(|id| id == item.id) {
            return false;
        }
        item.destination
            .and_then(|cell| self.storage.location_at(cell))
            .is_some_and(|destination| destination == location)
    }
}
