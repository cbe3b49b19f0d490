//! End-to-end capacity scenarios against the in-memory world.
//!
//! Each test builds a small world, configures limits through the registry,
//! and drives the transfer guard the way the hauling loop does.

// Integration tests use expect/unwrap for clarity -- panicking on failure
// is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing,
    clippy::unreachable
)]

use stockcap_core::occupancy::count_present;
use stockcap_core::{AdmissionController, Capacity, HaulDecision, TransferGuard};
use stockcap_limits::{LimitEdit, LimitRegistry, LimitSnapshot};
use stockcap_types::{
    CapacityMode, Cell, ItemStack, LocationId, PolicyId, ResourceKind, StorageKind, WorkItem,
    WorkItemId,
};
use stockcap_world::World;

// =============================================================================
// Helpers
// =============================================================================

const L_CELL: Cell = Cell::new(0, 0);

fn steel() -> ResourceKind {
    ResourceKind::new("steel")
}

/// A world with a single stockpile `L` holding `present` steel, limited to
/// `limit` steel.
fn stockpile(limit: i64, present: u32) -> (World, LimitRegistry, PolicyId, LocationId) {
    let mut world = World::new();
    let policy = world.create_policy(StorageKind::Stockpile);
    let location = world
        .add_location("L", policy, [L_CELL, Cell::new(1, 0)])
        .expect("location");
    if present > 0 {
        world
            .deposit(location, ItemStack::new(steel(), present))
            .expect("deposit");
    }
    let mut limits = LimitRegistry::new();
    limits.set_limit(policy, &steel(), limit);
    (world, limits, policy, location)
}

fn give_haul(world: &mut World, name: &str, count: u32) -> WorkItemId {
    let item = WorkItem::haul_to_storage(ItemStack::new(steel(), count), L_CELL);
    let id = item.id;
    let agent = world.add_agent(name);
    world.agent_mut(agent).expect("agent").assign(item);
    id
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn mode_divergence() {
    let (mut world, limits, _, location) = stockpile(10, 4);
    give_haul(&mut world, "Other", 4);

    let ctl = AdmissionController::new(&limits, &world, &world);
    assert_eq!(
        ctl.available_capacity(location, &steel(), CapacityMode::PhysicalOnly, None),
        Capacity::Bounded(6)
    );
    assert_eq!(
        ctl.available_capacity(location, &steel(), CapacityMode::IncludingReservations, None),
        Capacity::Bounded(2)
    );
}

#[test]
fn scenario_a_partial_room() {
    let (mut world, limits, _, location) = stockpile(5, 3);
    let mine = give_haul(&mut world, "X", 10);

    let ctl = AdmissionController::new(&limits, &world, &world);
    assert_eq!(ctl.admit(10, location, &steel(), Some(mine)), 2);
}

#[test]
fn scenario_b_other_agent_reservation() {
    let (mut world, limits, _, location) = stockpile(5, 0);
    give_haul(&mut world, "A", 3);

    let ctl = AdmissionController::new(&limits, &world, &world);
    assert_eq!(ctl.admit(4, location, &steel(), None), 2);

    let guard = TransferGuard::new(&limits, &world, &world);
    let b_haul = WorkItem::haul_to_storage(ItemStack::new(steel(), 4), L_CELL);
    match guard.clamp_haul(b_haul) {
        HaulDecision::Dispatch(item) => assert_eq!(item.requested, 2),
        HaulDecision::Inadmissible => unreachable!("two units still fit"),
    }
}

#[test]
fn scenario_c_cleared_limit() {
    let (mut world, mut limits, policy, location) = stockpile(5, 5);
    limits.set_limit(policy, &steel(), 0);
    give_haul(&mut world, "A", 50);

    let guard = TransferGuard::new(&limits, &world, &world);
    for mode in [CapacityMode::PhysicalOnly, CapacityMode::IncludingReservations] {
        assert!(!guard.admission().is_full(location, &steel(), mode));
    }
    assert_eq!(guard.filter_destinations(&[location], &steel()), vec![location]);
    assert!(guard.may_deposit(L_CELL, &steel()));
}

#[test]
fn self_exclusion_ignores_carried_size() {
    let (mut world, limits, _, location) = stockpile(100, 0);
    let mine = give_haul(&mut world, "Me", 99);

    let ctl = AdmissionController::new(&limits, &world, &world);
    assert_eq!(
        ctl.available_capacity(
            location,
            &steel(),
            CapacityMode::IncludingReservations,
            Some(mine)
        ),
        Capacity::Bounded(100)
    );
}

#[test]
fn reserved_space_does_not_stall_the_reserving_agent() {
    // The limit is fully reserved by the agent about to deliver. The
    // destination is no longer offered to others, but the delivery itself
    // goes through.
    let (mut world, limits, _, location) = stockpile(6, 0);
    give_haul(&mut world, "Deliverer", 6);

    let guard = TransferGuard::new(&limits, &world, &world);
    assert!(!guard.accepts_destination(location, &steel()));
    assert!(guard.may_deposit(L_CELL, &steel()));
}

#[test]
fn sequential_hauls_never_overfill() {
    let (mut world, limits, _, location) = stockpile(25, 0);
    // Dispatch as many hauls as admission allows, one agent per stack.
    for (index, count) in [10_u32, 10, 10, 10].into_iter().enumerate() {
        let item = WorkItem::haul_to_storage(ItemStack::new(steel(), count), L_CELL);
        let decision = TransferGuard::new(&limits, &world, &world).clamp_haul(item);
        if let HaulDecision::Dispatch(mut item) = decision {
            if let Some(target) = item.haul_target.as_mut() {
                target.count = item.requested;
            }
            let agent = world.add_agent(&format!("Hauler {index}"));
            world.agent_mut(agent).expect("agent").assign(item);
        }
    }

    // Deliver everything.
    for agent in world.agent_ids() {
        let item = world.agent_mut(agent).expect("agent").take_active();
        if let Some(stack) = item.and_then(|item| item.haul_target) {
            assert!(TransferGuard::new(&limits, &world, &world).may_deposit(L_CELL, &steel()));
            world.deposit(location, stack).expect("deposit");
        }
    }

    let ctl = AdmissionController::new(&limits, &world, &world);
    assert_eq!(
        ctl.available_capacity(location, &steel(), CapacityMode::PhysicalOnly, None),
        Capacity::Bounded(0)
    );
    assert_eq!(count_present(&world, location, &steel()), 25);
}

#[test]
fn copied_policy_limits_are_independent() {
    let mut world = World::new();
    let source = world.create_policy(StorageKind::Stockpile);
    let dest = world.create_policy(StorageKind::Stockpile);
    let mut limits = LimitRegistry::new();
    limits.set_limit(source, &steel(), 10);

    limits.copy_from(source, dest);
    limits.set_limit(source, &steel(), 3);
    assert_eq!(limits.get_limit(dest, &steel()).map(|l| l.get()), Some(10));
}

#[test]
fn snapshot_round_trip_drops_destroyed_policies() {
    let (mut world, mut limits, policy, _) = stockpile(5, 0);
    let doomed = world.create_policy(StorageKind::Shelf);
    limits.set_limit(doomed, &steel(), 9);
    world.destroy_policy(doomed).expect("destroy");

    let snapshot = limits.snapshot(|id| world.policy_exists(id));
    let json = snapshot.to_json().expect("encode");
    let restored = LimitRegistry::restore(&LimitSnapshot::from_json(&json).expect("decode"));

    assert_eq!(restored.get_limit(policy, &steel()).map(|l| l.get()), Some(5));
    assert!(!restored.has_any_limit(doomed));
}

#[test]
fn operator_edit_feeds_admission() {
    let (world, mut limits, policy, location) = stockpile(0, 2);
    let owner = world.policy_owner(policy).expect("owner");
    LimitEdit::default()
        .apply(&mut limits, owner, policy, &steel(), "7")
        .expect("edit");

    let ctl = AdmissionController::new(&limits, &world, &world);
    assert_eq!(ctl.admit(20, location, &steel(), None), 5);
}
