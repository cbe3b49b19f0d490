//! The decision points where capacity gates agent behaviour.
//!
//! Each method is a thin policy over [`AdmissionController`] and is
//! evaluated once per agent per step. None of them error: a `false` or an
//! [`HaulDecision::Inadmissible`] is the blocked signal, and the caller
//! falls back to whatever it does when no work is found.

use stockcap_limits::LimitRegistry;
use stockcap_types::{CapacityMode, Cell, ItemStack, LocationId, ResourceKind, WorkItem};
use stockcap_world::{StorageView, WorkView};
use tracing::debug;

use crate::admission::AdmissionController;

/// Outcome of sizing a haul against its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaulDecision {
    /// Dispatch this work item; its requested quantity may have shrunk.
    Dispatch(WorkItem),
    /// Nothing fits. Do not create the work item.
    Inadmissible,
}

/// Capacity checks at the points where agents commit to, or complete, a
/// transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferGuard<'a, S, W> {
    admission: AdmissionController<'a, S, W>,
}

impl<'a, S: StorageView, W: WorkView> TransferGuard<'a, S, W> {
    /// Create a guard over the given registry and world views.
    pub const fn new(limits: &'a LimitRegistry, storage: &'a S, work: &'a W) -> Self {
        Self {
            admission: AdmissionController::new(limits, storage, work),
        }
    }

    /// The underlying admission controller.
    pub const fn admission(&self) -> &AdmissionController<'a, S, W> {
        &self.admission
    }

    // -------------------------------------------------------------------
    // Destination filtering
    // -------------------------------------------------------------------

    /// Whether `location` should be considered as a destination for `kind`.
    pub fn accepts_destination(&self, location: LocationId, kind: &ResourceKind) -> bool {
        let full = self
            .admission
            .is_full(location, kind, CapacityMode::IncludingReservations);
        if full {
            debug!(location = %location, kind = %kind, "destination full once pending hauls land");
        }
        !full
    }

    /// Keep only candidates that still have room for `kind`, in the
    /// caller's order.
    pub fn filter_destinations(
        &self,
        candidates: &[LocationId],
        kind: &ResourceKind,
    ) -> Vec<LocationId> {
        candidates
            .iter()
            .copied()
            .filter(|location| self.accepts_destination(*location, kind))
            .collect()
    }

    /// The first candidate, in priority order, that still has room.
    pub fn best_destination(
        &self,
        candidates: &[LocationId],
        kind: &ResourceKind,
    ) -> Option<LocationId> {
        candidates
            .iter()
            .copied()
            .find(|location| self.accepts_destination(*location, kind))
    }

    // -------------------------------------------------------------------
    // Mid-transfer blocking
    // -------------------------------------------------------------------

    /// Whether an agent standing at `cell` may put `kind` down there.
    ///
    /// Only what is physically present blocks. Cells outside storage never
    /// block.
    pub fn may_deposit(&self, cell: Cell, kind: &ResourceKind) -> bool {
        let Some(location) = self.admission.storage().location_at(cell) else {
            return true;
        };
        let blocked = self
            .admission
            .is_full(location, kind, CapacityMode::PhysicalOnly);
        if blocked {
            debug!(location = %location, kind = %kind, "deposit blocked, location physically full");
        }
        !blocked
    }

    // -------------------------------------------------------------------
    // In-flight quantity clamping
    // -------------------------------------------------------------------

    /// Shrink a haul's requested quantity to what its destination can
    /// still take.
    ///
    /// Work that is not a storage haul, or whose destination is not
    /// storage, passes through untouched.
    pub fn clamp_haul(&self, mut item: WorkItem) -> HaulDecision {
        if !item.job.reserves_storage() {
            return HaulDecision::Dispatch(item);
        }
        let Some(location) = item
            .destination
            .and_then(|cell| self.admission.storage().location_at(cell))
        else {
            return HaulDecision::Dispatch(item);
        };

        let admitted = self
            .admission
            .admit(item.requested, location, &item.kind, Some(item.id));
        if admitted == 0 {
            debug!(
                work_item = %item.id,
                location = %location,
                kind = %item.kind,
                requested = item.requested,
                "haul inadmissible"
            );
            return HaulDecision::Inadmissible;
        }
        if admitted < item.requested {
            debug!(
                work_item = %item.id,
                location = %location,
                kind = %item.kind,
                requested = item.requested,
                admitted,
                "haul clamped"
            );
        }
        item.requested = admitted;
        HaulDecision::Dispatch(item)
    }

    // -------------------------------------------------------------------
    // Opportunistic pickup
    // -------------------------------------------------------------------

    /// Whether `extra` may be folded into `haul` on the way.
    ///
    /// Accepted only if the haul's destination can take the haul's own
    /// stack plus `extra` on top of everything else already committed.
    pub fn accept_opportunistic(&self, haul: &WorkItem, extra: &ItemStack) -> bool {
        if extra.kind != haul.kind {
            return false;
        }
        let Some(location) = haul
            .destination
            .and_then(|cell| self.admission.storage().location_at(cell))
        else {
            return true;
        };

        let needed = haul.carried_count().saturating_add(extra.count);
        let fits = self
            .admission
            .available_capacity(
                location,
                &haul.kind,
                CapacityMode::IncludingReservations,
                Some(haul.id),
            )
            .fits(needed);
        if !fits {
            debug!(
                work_item = %haul.id,
                location = %location,
                kind = %haul.kind,
                extra = extra.count,
                "opportunistic pickup suppressed"
            );
        }
        fits
    }
}

#[cfg(test)]
mod tests {
    use stockcap_types::{JobKind, PolicyId, StorageKind};
    use stockcap_world::World;

    use super::*;

    fn steel() -> ResourceKind {
        ResourceKind::new("steel")
    }

    fn setup(limit: i64) -> (World, LimitRegistry, PolicyId, LocationId) {
        let mut world = World::new();
        let policy = world.create_policy(StorageKind::Stockpile);
        let location = world
            .add_location("Yard", policy, [Cell::new(0, 0), Cell::new(0, 1)])
            .unwrap_or_default();
        let mut limits = LimitRegistry::new();
        limits.set_limit(policy, &steel(), limit);
        (world, limits, policy, location)
    }

    fn haul(count: u32) -> WorkItem {
        WorkItem::haul_to_storage(ItemStack::new(steel(), count), Cell::new(0, 0))
    }

    fn give(world: &mut World, item: WorkItem) {
        let agent = world.add_agent("Hauler");
        if let Ok(work) = world.agent_mut(agent) {
            work.assign(item);
        }
    }

    #[test]
    fn full_destinations_are_filtered_out() {
        let (mut world, mut limits, _, yard) = setup(5);
        let open_policy = world.create_policy(StorageKind::Shelf);
        let shelf = world
            .add_location("Shelf", open_policy, [Cell::new(9, 9)])
            .unwrap_or_default();
        limits.set_limit(open_policy, &steel(), 50);
        give(&mut world, haul(5));

        let guard = TransferGuard::new(&limits, &world, &world);
        assert_eq!(guard.filter_destinations(&[yard, shelf], &steel()), vec![shelf]);
        assert_eq!(guard.best_destination(&[yard, shelf], &steel()), Some(shelf));
        assert_eq!(guard.best_destination(&[yard], &steel()), None);
    }

    #[test]
    fn unlimited_destination_never_filtered() {
        let (mut world, limits, _, yard) = setup(0);
        let _ = world.deposit(yard, ItemStack::new(steel(), 500));
        let guard = TransferGuard::new(&limits, &world, &world);
        assert_eq!(guard.filter_destinations(&[yard], &steel()), vec![yard]);
    }

    #[test]
    fn deposit_ignores_reservations() {
        let (mut world, limits, _, yard) = setup(10);
        let _ = world.deposit(yard, ItemStack::new(steel(), 4));
        give(&mut world, haul(6));

        let guard = TransferGuard::new(&limits, &world, &world);
        assert!(!guard.accepts_destination(yard, &steel()));
        assert!(guard.may_deposit(Cell::new(0, 1), &steel()));
    }

    #[test]
    fn deposit_blocked_when_physically_full() {
        let (mut world, limits, _, yard) = setup(4);
        let _ = world.deposit(yard, ItemStack::new(steel(), 4));
        let guard = TransferGuard::new(&limits, &world, &world);
        assert!(!guard.may_deposit(Cell::new(0, 0), &steel()));
        assert!(guard.may_deposit(Cell::new(0, 0), &ResourceKind::new("wood")));
        assert!(guard.may_deposit(Cell::new(30, 30), &steel()));
    }

    #[test]
    fn clamp_shrinks_requested_quantity() {
        let (mut world, limits, _, yard) = setup(5);
        let _ = world.deposit(yard, ItemStack::new(steel(), 3));
        let guard = TransferGuard::new(&limits, &world, &world);

        let item = haul(10);
        let mut expected = item.clone();
        expected.requested = 2;
        assert_eq!(guard.clamp_haul(item), HaulDecision::Dispatch(expected));
    }

    #[test]
    fn clamp_to_zero_is_inadmissible() {
        let (mut world, limits, _, yard) = setup(5);
        let _ = world.deposit(yard, ItemStack::new(steel(), 5));
        let guard = TransferGuard::new(&limits, &world, &world);
        assert_eq!(guard.clamp_haul(haul(1)), HaulDecision::Inadmissible);
    }

    #[test]
    fn clamp_excludes_the_item_itself() {
        let (mut world, limits, _, _) = setup(8);
        let mine = haul(8);
        give(&mut world, mine.clone());
        let guard = TransferGuard::new(&limits, &world, &world);
        assert_eq!(guard.clamp_haul(mine.clone()), HaulDecision::Dispatch(mine));
    }

    #[test]
    fn clamp_passes_through_non_storage_work() {
        let (mut world, limits, _, yard) = setup(1);
        let _ = world.deposit(yard, ItemStack::new(steel(), 1));
        let guard = TransferGuard::new(&limits, &world, &world);

        let mut equip = haul(5);
        equip.job = JobKind::Equip;
        assert_eq!(guard.clamp_haul(equip.clone()), HaulDecision::Dispatch(equip));

        let mut elsewhere = haul(5);
        elsewhere.destination = Some(Cell::new(70, 70));
        assert_eq!(guard.clamp_haul(elsewhere.clone()), HaulDecision::Dispatch(elsewhere));
    }

    #[test]
    fn opportunistic_pickup_respects_remaining_room() {
        let (mut world, limits, _, yard) = setup(10);
        let _ = world.deposit(yard, ItemStack::new(steel(), 2));
        let mine = haul(5);
        give(&mut world, mine.clone());
        let guard = TransferGuard::new(&limits, &world, &world);

        // 2 present + 5 carried leaves room for 3.
        assert!(guard.accept_opportunistic(&mine, &ItemStack::new(steel(), 3)));
        assert!(!guard.accept_opportunistic(&mine, &ItemStack::new(steel(), 4)));
    }

    #[test]
    fn opportunistic_pickup_counts_other_agents() {
        let (mut world, limits, _, _) = setup(10);
        give(&mut world, haul(6));
        let mine = haul(3);
        let guard = TransferGuard::new(&limits, &world, &world);
        assert!(guard.accept_opportunistic(&mine, &ItemStack::new(steel(), 1)));
        assert!(!guard.accept_opportunistic(&mine, &ItemStack::new(steel(), 2)));
    }

    #[test]
    fn opportunistic_pickup_rejects_other_kinds() {
        let (world, limits, _, _) = setup(0);
        let guard = TransferGuard::new(&limits, &world, &world);
        assert!(!guard.accept_opportunistic(&haul(1), &ItemStack::new(ResourceKind::new("wood"), 1)));
        assert!(guard.accept_opportunistic(&haul(1), &ItemStack::new(steel(), 1000)));
    }
}
