//! The discrete-step hauling loop.
//!
//! Each step visits agents in roster order. An agent with work delivers
//! it; an idle agent looks for a loose stack, sizes a haul against the
//! best destination, and may fold a second stack of the same kind into
//! it. Every capacity question goes through [`TransferGuard`], so the
//! loop itself never does limit arithmetic.
//!
//! Each step starts by tearing down storage scheduled for that step and
//! dropping limits whose policy no longer exists.

use std::collections::HashMap;
use std::num::NonZeroU32;

use stockcap_core::{HaulDecision, OccupancySnapshot, TransferGuard};
use stockcap_limits::{LimitRegistry, LimitSnapshot};
use stockcap_types::{AgentId, Cell, ItemStack, LocationId, ResourceKind, WorkItem, WorkItemId};
use stockcap_world::{StorageLocation, StorageView, World, WorldError};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::setup::StartingState;

// -----------------------------------------------------------------------
// Statistics
// -----------------------------------------------------------------------

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Steps executed.
    pub steps: u64,
    /// Hauls handed to an agent.
    pub dispatched: u32,
    /// Dispatched hauls whose quantity was cut to fit.
    pub clamped: u32,
    /// Proposed hauls dropped because nothing fit.
    pub inadmissible: u32,
    /// Extra stacks folded into a haul on the way.
    pub merged: u32,
    /// Hauls that reached their destination.
    pub delivered: u32,
    /// Units put into storage.
    pub units_delivered: u64,
    /// Deliveries refused at the destination.
    pub blocked: u32,
    /// Storage locations torn down.
    pub demolished: u32,
    /// Hauls cancelled because their destination went away.
    pub cancelled: u32,
}

/// A configured limit found exceeded after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where the limit was exceeded.
    pub location: LocationId,
    /// The over-limit resource.
    pub kind: ResourceKind,
    /// Units present.
    pub occupied: u32,
    /// The configured limit.
    pub limit: u32,
}

// -----------------------------------------------------------------------
// HaulingRun
// -----------------------------------------------------------------------

/// World state plus the bookkeeping the loop needs between steps.
#[derive(Debug)]
pub struct HaulingRun {
    world: World,
    limits: LimitRegistry,
    destinations: Vec<LocationId>,
    max_carry: u32,
    demolitions: Vec<(u64, LocationId)>,
    origins: HashMap<WorkItemId, Cell>,
    stats: RunStats,
}

impl HaulingRun {
    /// Start a run from `state`, carrying at most `max_carry` per haul.
    pub fn new(state: StartingState, max_carry: u32) -> Self {
        Self {
            world: state.world,
            limits: state.limits,
            destinations: state.destinations,
            demolitions: state.demolitions,
            max_carry,
            origins: HashMap::new(),
            stats: RunStats::default(),
        }
    }

    /// The world as it currently stands.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Counters so far.
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    /// A snapshot of the limits on policies that still exist.
    pub fn snapshot(&self) -> LimitSnapshot {
        self.limits.snapshot(|policy| self.world.policy_exists(policy))
    }

    /// Run up to `steps` steps, stopping early once a step changes nothing
    /// and no demolition is still pending.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] if the world rejects a move the loop
    /// believed valid.
    pub fn run(&mut self, steps: u64) -> Result<(), EngineError> {
        for step in 0..steps {
            if !self.step()? && self.demolitions.is_empty() {
                info!(step, "hauling settled");
                break;
            }
        }
        Ok(())
    }

    /// Advance every agent once. Returns whether anything happened.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] if an agent or stack disappears
    /// mid-step.
    pub fn step(&mut self) -> Result<bool, EngineError> {
        self.stats.steps = self.stats.steps.saturating_add(1);
        let mut progressed = false;

        let step = self.stats.steps;
        let due: Vec<LocationId> = self
            .demolitions
            .iter()
            .filter(|(at, _)| *at <= step)
            .map(|(_, location)| *location)
            .collect();
        self.demolitions.retain(|(at, _)| *at > step);
        for location in due {
            self.demolish(location)?;
            progressed = true;
        }

        let world = &self.world;
        self.limits.prune(|policy| world.policy_exists(policy));

        for agent in self.world.agent_ids() {
            let busy = self.world.agent_mut(agent)?.promote_next();
            let acted = if busy {
                self.deliver(agent)?
            } else {
                self.dispatch(agent)?
            };
            progressed |= acted;
        }
        Ok(progressed)
    }

    /// Every configured limit that is currently exceeded.
    pub fn audit(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        for &location in &self.destinations {
            let Some(limits) = self
                .world
                .policy_of(location)
                .and_then(|policy| self.limits.limits_for(policy))
            else {
                continue;
            };
            let occupancy = OccupancySnapshot::take(&self.world, location);
            for (kind, limit) in limits.limits() {
                let occupied = occupancy.count(kind);
                if occupied > limit.get() {
                    violations.push(Violation {
                        location,
                        kind: kind.clone(),
                        occupied,
                        limit: limit.get(),
                    });
                }
            }
        }
        violations
    }

    /// Log what each destination holds against its limits.
    pub fn log_summary(&self) {
        for &location in &self.destinations {
            let Some(storage) = self.world.location(location) else {
                continue;
            };
            let occupancy = OccupancySnapshot::take(&self.world, location);
            let limits = self
                .world
                .policy_of(location)
                .and_then(|policy| self.limits.limits_for(policy));
            for (kind, held) in occupancy.by_kind() {
                let limit = limits.and_then(|map| map.get(kind)).map(NonZeroU32::get);
                info!(location = %storage.name, kind = %kind, held, limit = ?limit, "stored");
            }
        }
        let loose: u64 = self
            .world
            .ground_items()
            .iter()
            .map(|(_, stack)| u64::from(stack.count))
            .sum();
        info!(stats = ?self.stats, loose_units = loose, "run summary");
    }

    // -------------------------------------------------------------------
    // Demolition
    // -------------------------------------------------------------------

    /// Tear down a storage location.
    ///
    /// Hauls headed there are cancelled and their stacks go back to where
    /// they were picked up. What the location held is left on its cells as
    /// loose stacks. The policy is destroyed, and its limits with it, once
    /// no other location follows it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::World`] if the location does not exist.
    pub fn demolish(&mut self, location: LocationId) -> Result<(), EngineError> {
        let cells = self
            .world
            .location(location)
            .map(|storage| storage.cells.clone())
            .ok_or(WorldError::LocationNotFound(location))?;

        for agent in self.world.agent_ids() {
            let doomed: Vec<WorkItemId> = self
                .world
                .agent(agent)
                .map(|work| {
                    work.work_items()
                        .filter(|item| item.destination.is_some_and(|cell| cells.contains(&cell)))
                        .map(|item| item.id)
                        .collect()
                })
                .unwrap_or_default();
            for id in doomed {
                let Some(item) = self.world.agent_mut(agent)?.cancel(id) else {
                    continue;
                };
                let origin = self.origins.remove(&item.id).or(item.destination);
                if let (Some(stack), Some(cell)) = (item.haul_target, origin) {
                    self.world.drop_on_ground(cell, stack);
                }
                self.stats.cancelled = self.stats.cancelled.saturating_add(1);
                debug!(agent = %agent, work_item = %id, "haul cancelled, destination demolished");
            }
        }

        let removed = self.world.remove_location(location)?;
        if let Some(cell) = removed.entry_cell() {
            for stack in removed.held() {
                self.world.drop_on_ground(cell, stack.clone());
            }
        }
        self.destinations.retain(|id| *id != location);

        let policy = removed.policy;
        let shared = self.world.locations().any(|other| other.policy == policy);
        if !shared && self.world.policy_exists(policy) {
            self.world.destroy_policy(policy)?;
            let had_limits = self.limits.remove_policy(policy);
            debug!(policy = %policy, had_limits, "storage policy destroyed");
        }

        self.stats.demolished = self.stats.demolished.saturating_add(1);
        info!(
            location = %removed.name,
            spilled = removed.held().len(),
            policy_kept = shared,
            "storage demolished"
        );
        Ok(())
    }

    // -------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------

    fn dispatch(&mut self, agent: AgentId) -> Result<bool, EngineError> {
        let Some((item, origin)) = self.plan_haul()? else {
            return Ok(false);
        };
        debug!(
            agent = %agent,
            work_item = %item.id,
            kind = %item.kind,
            count = item.carried_count(),
            "haul dispatched"
        );
        self.origins.insert(item.id, origin);
        self.world.agent_mut(agent)?.assign(item);
        self.stats.dispatched = self.stats.dispatched.saturating_add(1);
        Ok(true)
    }

    /// Pick the first loose stack that some destination can still take and
    /// lift the admitted part of it.
    fn plan_haul(&mut self) -> Result<Option<(WorkItem, Cell)>, EngineError> {
        let loose: Vec<(Cell, ItemStack)> = self.world.ground_items().to_vec();
        for (origin, stack) in loose {
            let guard = TransferGuard::new(&self.limits, &self.world, &self.world);
            let Some(destination) = guard.best_destination(&self.destinations, &stack.kind) else {
                continue;
            };
            let Some(cell) = self
                .world
                .location(destination)
                .and_then(StorageLocation::entry_cell)
            else {
                continue;
            };

            let carry = stack.count.min(self.max_carry);
            let proposal = WorkItem::haul_to_storage(
                ItemStack {
                    count: carry,
                    ..stack.clone()
                },
                cell,
            );
            let mut item = match guard.clamp_haul(proposal) {
                HaulDecision::Dispatch(item) => item,
                HaulDecision::Inadmissible => {
                    self.stats.inadmissible = self.stats.inadmissible.saturating_add(1);
                    debug!(item = %stack.id, kind = %stack.kind, "no room for loose stack");
                    continue;
                }
            };
            if item.requested < carry {
                self.stats.clamped = self.stats.clamped.saturating_add(1);
            }

            let lifted = self.world.split_from_ground(stack.id, item.requested)?;
            item.haul_target = Some(lifted);
            self.fold_extra(&mut item)?;
            return Ok(Some((item, origin)));
        }
        Ok(None)
    }

    /// Fold one more loose stack of the same kind into `item` if both the
    /// agent and the destination have room for it.
    fn fold_extra(&mut self, item: &mut WorkItem) -> Result<(), EngineError> {
        let room = self.max_carry.saturating_sub(item.carried_count());
        let own = item.haul_target.as_ref().map(|target| target.id);
        let candidate = self
            .world
            .ground_items()
            .iter()
            .map(|(_, stack)| stack)
            .find(|stack| {
                Some(stack.id) != own
                    && stack.kind == item.kind
                    && stack.count > 0
                    && stack.count <= room
            })
            .cloned();
        let Some(extra) = candidate else {
            return Ok(());
        };

        let guard = TransferGuard::new(&self.limits, &self.world, &self.world);
        if !guard.accept_opportunistic(item, &extra) {
            return Ok(());
        }

        let (_, extra) = self.world.take_from_ground(extra.id)?;
        if let Some(target) = item.haul_target.as_mut() {
            target.count = target.count.saturating_add(extra.count);
        }
        item.requested = item.requested.saturating_add(extra.count);
        self.stats.merged = self.stats.merged.saturating_add(1);
        debug!(work_item = %item.id, extra = extra.count, "picked up extra stack");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Delivery
    // -------------------------------------------------------------------

    fn deliver(&mut self, agent: AgentId) -> Result<bool, EngineError> {
        let Some(item) = self.world.agent_mut(agent)?.take_active() else {
            return Ok(false);
        };
        let origin = self.origins.remove(&item.id);
        let (Some(stack), Some(cell)) = (item.haul_target, item.destination) else {
            return Ok(true);
        };

        let guard = TransferGuard::new(&self.limits, &self.world, &self.world);
        if !guard.may_deposit(cell, &stack.kind) {
            warn!(
                agent = %agent,
                work_item = %item.id,
                kind = %stack.kind,
                count = stack.count,
                "delivery refused, returning stack"
            );
            self.world.drop_on_ground(origin.unwrap_or(cell), stack);
            self.stats.blocked = self.stats.blocked.saturating_add(1);
            return Ok(true);
        }

        let units = u64::from(stack.count);
        match self.world.location_at(cell) {
            Some(location) => self.world.deposit(location, stack)?,
            None => self.world.drop_on_ground(cell, stack),
        }
        self.stats.delivered = self.stats.delivered.saturating_add(1);
        self.stats.units_delivered = self.stats.units_delivered.saturating_add(units);
        Ok(true)
    }
}
