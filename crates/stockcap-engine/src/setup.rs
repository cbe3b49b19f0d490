//! Builds the starting world from the `simulation` config section.
//!
//! Storage locations are created in config order, which is also the
//! destination priority order. Each stockpile's policy id is derived from
//! its name, so limits saved by an earlier run land on the same policy.
//! Configured limits only fill kinds the saved limits leave unset, and go
//! through the same [`LimitEdit`] path an operator uses. Loose stacks are
//! scattered over cells outside storage.

use std::path::Path;

use rand::Rng;
use stockcap_core::config::SimulationConfig;
use stockcap_limits::{LimitEdit, LimitRegistry, LimitSnapshot};
use stockcap_types::{Cell, ItemStack, LocationId, PolicyId, ResourceKind, StorageKind};
use stockcap_world::{StorageView, World};
use tracing::{debug, info};

use crate::error::EngineError;

/// Half-width of the square loose stacks are scattered over.
const GROUND_SPREAD: i32 = 30;

/// Attempts at finding a free cell before giving up on a stack.
const PLACEMENT_ATTEMPTS: u32 = 64;

/// Everything the hauling run starts from.
#[derive(Debug)]
pub struct StartingState {
    /// The map, its storage and its agents.
    pub world: World,
    /// Limits configured on the storage policies.
    pub limits: LimitRegistry,
    /// Storage locations in destination priority order.
    pub destinations: Vec<LocationId>,
    /// Locations to tear down, keyed by the step they go at.
    pub demolitions: Vec<(u64, LocationId)>,
}

/// Read the limits saved at `path`, or an empty registry if there are none.
///
/// # Errors
///
/// Returns [`EngineError::Limits`] if the file exists but cannot be read
/// or parsed.
pub fn restore_limits(path: &Path) -> Result<LimitRegistry, EngineError> {
    if !path.exists() {
        info!(path = %path.display(), "No limit snapshot, starting without saved limits");
        return Ok(LimitRegistry::new());
    }
    let snapshot = LimitSnapshot::load(path)?;
    info!(
        path = %path.display(),
        saved_at = %snapshot.saved_at,
        entries = snapshot.entries.len(),
        "Limit snapshot restored"
    );
    Ok(LimitRegistry::restore(&snapshot))
}

/// Create storage, limits, loose stacks and agents from `config`.
///
/// `limits` holds whatever an earlier run saved. Maps for policies no
/// stockpile claims any more are dropped.
///
/// # Errors
///
/// Returns [`EngineError::World`] if two stockpiles overlap, share a name
/// or one covers no cells, [`EngineError::Limits`] if limits are configured
/// on something that is not storage, and [`EngineError::Setup`] if the
/// config has no storage or a loose stack cannot be placed.
pub fn build(
    config: &SimulationConfig,
    edit: LimitEdit,
    mut limits: LimitRegistry,
    rng: &mut impl Rng,
) -> Result<StartingState, EngineError> {
    if config.stockpiles.is_empty() {
        return Err(EngineError::Setup {
            message: String::from("no stockpiles configured"),
        });
    }

    let mut world = World::new();
    let mut destinations = Vec::with_capacity(config.stockpiles.len());
    let mut demolitions = Vec::new();

    for pile in &config.stockpiles {
        let policy = PolicyId::from_name(&pile.name);
        world.register_policy(policy, pile.owner)?;
        let location = world.add_location(&pile.name, policy, pile.cells())?;
        destinations.push(location);
        if let Some(step) = pile.demolish_at_step {
            demolitions.push((step, location));
        }
    }

    limits.prune(|policy| {
        world
            .policy_owner(policy)
            .is_some_and(StorageKind::is_bounded_storage)
    });

    for pile in &config.stockpiles {
        let policy = PolicyId::from_name(&pile.name);
        for (kind, value) in &pile.limits {
            let kind = ResourceKind::new(kind.as_str());
            if let Some(saved) = limits.get_limit(policy, &kind) {
                debug!(location = %pile.name, kind = %kind, limit = saved.get(), "saved limit kept");
                continue;
            }
            let applied = edit.apply(&mut limits, pile.owner, policy, &kind, &value.to_string())?;
            debug!(location = %pile.name, kind = %kind, limit = ?applied, "limit configured");
        }
    }

    for item in &config.ground_items {
        let cell = free_cell(&world, rng).ok_or_else(|| EngineError::Setup {
            message: format!("no free cell for {} x{}", item.kind, item.count),
        })?;
        world.drop_on_ground(
            cell,
            ItemStack::new(ResourceKind::new(item.kind.as_str()), item.count),
        );
    }

    for index in 1..=config.agents {
        world.add_agent(&format!("Hauler {index}"));
    }

    info!(
        locations = destinations.len(),
        limited_policies = limits.policy_count(),
        loose_stacks = world.ground_items().len(),
        agents = config.agents,
        demolitions = demolitions.len(),
        "Starting world built"
    );

    Ok(StartingState {
        world,
        limits,
        destinations,
        demolitions,
    })
}

/// A random cell that belongs to no storage location.
fn free_cell(world: &World, rng: &mut impl Rng) -> Option<Cell> {
    (0..PLACEMENT_ATTEMPTS)
        .map(|_| {
            Cell::new(
                rng.random_range(-GROUND_SPREAD..=GROUND_SPREAD),
                rng.random_range(-GROUND_SPREAD..=GROUND_SPREAD),
            )
        })
        .find(|cell| world.location_at(*cell).is_none())
}
