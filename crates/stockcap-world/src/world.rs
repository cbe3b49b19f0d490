//! In-memory world: storage policies, storage locations, agents, and loose
//! item stacks lying on the ground.
//!
//! Storage policies have their own lifecycle here. Destroying one does not
//! touch the locations that pointed at it; those locations simply stop
//! resolving a policy through [`StorageView::policy_of`], which is exactly
//! the dangling-reference situation the capacity subsystem must survive.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use stockcap_types::{AgentId, Cell, ItemId, ItemStack, LocationId, PolicyId, StorageKind};
use tracing::debug;

use crate::agent::AgentWork;
use crate::error::WorldError;
use crate::location::StorageLocation;
use crate::view::{StorageView, WorkView};

/// Everything the capacity subsystem can observe.
#[derive(Debug, Clone, Default)]
pub struct World {
    /// Live storage policies and the kind of object that owns each.
    policies: BTreeMap<PolicyId, StorageKind>,
    /// Storage locations indexed by id.
    locations: BTreeMap<LocationId, StorageLocation>,
    /// Which location each storage cell belongs to.
    cell_index: HashMap<Cell, LocationId>,
    /// Agents in evaluation order.
    agents: Vec<AgentWork>,
    /// Loose stacks waiting to be hauled.
    ground: Vec<(Cell, ItemStack)>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------
    // Policies
    // -------------------------------------------------------------------

    /// Create a storage policy owned by an object of kind `owner`.
    pub fn create_policy(&mut self, owner: StorageKind) -> PolicyId {
        let id = PolicyId::new();
        self.policies.insert(id, owner);
        id
    }

    /// Register a policy under an id chosen by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PolicyExists`] if the id is already live.
    pub fn register_policy(&mut self, id: PolicyId, owner: StorageKind) -> Result<(), WorldError> {
        if self.policies.contains_key(&id) {
            return Err(WorldError::PolicyExists(id));
        }
        self.policies.insert(id, owner);
        Ok(())
    }

    /// Destroy a policy. Locations that used it keep the stale id.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PolicyNotFound`] if the policy is not live.
    pub fn destroy_policy(&mut self, policy: PolicyId) -> Result<(), WorldError> {
        self.policies
            .remove(&policy)
            .map(|_owner| ())
            .ok_or(WorldError::PolicyNotFound(policy))
    }

    /// Whether the policy exists.
    pub fn policy_exists(&self, policy: PolicyId) -> bool {
        self.policies.contains_key(&policy)
    }

    /// The kind of object owning a live policy.
    pub fn policy_owner(&self, policy: PolicyId) -> Option<StorageKind> {
        self.policies.get(&policy).copied()
    }

    // -------------------------------------------------------------------
    // Locations
    // -------------------------------------------------------------------

    /// Create a storage location over `cells` following `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PolicyNotFound`] for an unknown policy,
    /// [`WorldError::NoCells`] when `cells` is empty, or
    /// [`WorldError::CellTaken`] if a cell already belongs to storage.
    pub fn add_location(
        &mut self,
        name: &str,
        policy: PolicyId,
        cells: impl IntoIterator<Item = Cell>,
    ) -> Result<LocationId, WorldError> {
        if !self.policy_exists(policy) {
            return Err(WorldError::PolicyNotFound(policy));
        }
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(WorldError::NoCells(name.to_owned()));
        }
        for cell in &cells {
            if let Some(location) = self.cell_index.get(cell) {
                return Err(WorldError::CellTaken {
                    cell: *cell,
                    location: *location,
                });
            }
        }

        let location = StorageLocation::new(name, policy, cells);
        let id = location.id;
        for cell in &location.cells {
            self.cell_index.insert(*cell, id);
        }
        debug!(location = %id, name, cells = location.cells.len(), "storage location added");
        self.locations.insert(id, location);
        Ok(id)
    }

    /// Remove a storage location and free its cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LocationNotFound`] if it does not exist.
    pub fn remove_location(&mut self, id: LocationId) -> Result<StorageLocation, WorldError> {
        let location = self
            .locations
            .remove(&id)
            .ok_or(WorldError::LocationNotFound(id))?;
        for cell in &location.cells {
            self.cell_index.remove(cell);
        }
        Ok(location)
    }

    /// Get a storage location.
    pub fn location(&self, id: LocationId) -> Option<&StorageLocation> {
        self.locations.get(&id)
    }

    /// Get a storage location mutably.
    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut StorageLocation> {
        self.locations.get_mut(&id)
    }

    /// Iterate over all storage locations in id order.
    pub fn locations(&self) -> impl Iterator<Item = &StorageLocation> {
        self.locations.values()
    }

    /// Put a stack into a storage location.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LocationNotFound`] if it does not exist.
    pub fn deposit(&mut self, id: LocationId, stack: ItemStack) -> Result<(), WorldError> {
        self.locations
            .get_mut(&id)
            .ok_or(WorldError::LocationNotFound(id))?
            .deposit(stack);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Agents
    // -------------------------------------------------------------------

    /// Add an idle agent at the end of the evaluation order.
    pub fn add_agent(&mut self, name: &str) -> AgentId {
        let agent = AgentWork::new(name);
        let id = agent.id;
        self.agents.push(agent);
        id
    }

    /// Get an agent's work state.
    pub fn agent(&self, id: AgentId) -> Option<&AgentWork> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    /// Get an agent's work state mutably.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AgentNotFound`] if it does not exist.
    pub fn agent_mut(&mut self, id: AgentId) -> Result<&mut AgentWork, WorldError> {
        self.agents
            .iter_mut()
            .find(|agent| agent.id == id)
            .ok_or(WorldError::AgentNotFound(id))
    }

    /// Agent ids in evaluation order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|agent| agent.id).collect()
    }

    // -------------------------------------------------------------------
    // Loose items
    // -------------------------------------------------------------------

    /// Leave a stack lying at `cell`.
    pub fn drop_on_ground(&mut self, cell: Cell, stack: ItemStack) {
        self.ground.push((cell, stack));
    }

    /// Loose stacks and where they lie.
    pub fn ground_items(&self) -> &[(Cell, ItemStack)] {
        &self.ground
    }

    /// Pick up a loose stack by identity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ItemNotFound`] if nothing with that id lies on
    /// the ground.
    pub fn take_from_ground(&mut self, id: ItemId) -> Result<(Cell, ItemStack), WorldError> {
        let position = self
            .ground
            .iter()
            .position(|(_, stack)| stack.id == id)
            .ok_or(WorldError::ItemNotFound(id))?;
        Ok(self.ground.swap_remove(position))
    }

    /// Take `count` units off a loose stack, leaving the remainder where it
    /// lies.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ItemNotFound`] if nothing with that id lies on
    /// the ground.
    pub fn split_from_ground(&mut self, id: ItemId, count: u32) -> Result<ItemStack, WorldError> {
        let (cell, mut stack) = self.take_from_ground(id)?;
        if stack.count > count {
            let rest = ItemStack::new(stack.kind.clone(), stack.count.saturating_sub(count));
            self.ground.push((cell, rest));
            stack.count = count;
        }
        Ok(stack)
    }
}

impl StorageView for World {
    fn location_at(&self, cell: Cell) -> Option<LocationId> {
        self.cell_index.get(&cell).copied()
    }

    fn policy_of(&self, location: LocationId) -> Option<PolicyId> {
        let policy = self.locations.get(&location)?.policy;
        self.policy_exists(policy).then_some(policy)
    }

    fn held_items(&self, location: LocationId) -> &[ItemStack] {
        self.locations
            .get(&location)
            .map(StorageLocation::held)
            .unwrap_or_default()
    }
}

impl WorkView for World {
    fn agents(&self) -> impl Iterator<Item = &AgentWork> {
        self.agents.iter()
    }
}
