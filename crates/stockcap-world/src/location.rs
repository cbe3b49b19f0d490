//! Storage locations: a contiguous group of cells sharing one policy.
//!
//! A [`StorageLocation`] holds physical item stacks. Several locations may
//! point at the same [`PolicyId`] (a stockpile split into separate cell
//! groups keeps one rule-set), but each counts its own contents.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use stockcap_types::{Cell, ItemStack, LocationId, PolicyId};

/// A storage location and the items physically inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    /// Identity of this location.
    pub id: LocationId,
    /// Display name used in logs.
    pub name: String,
    /// The storage policy this location follows.
    pub policy: PolicyId,
    /// Cells covered by this location.
    pub cells: BTreeSet<Cell>,
    /// Item stacks currently held here.
    held: Vec<ItemStack>,
}

impl StorageLocation {
    /// Create an empty location over `cells`.
    pub fn new(name: impl Into<String>, policy: PolicyId, cells: BTreeSet<Cell>) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            policy,
            cells,
            held: Vec::new(),
        }
    }

    /// Item stacks held here.
    pub fn held(&self) -> &[ItemStack] {
        &self.held
    }

    /// The cell an arriving haul should target.
    ///
    /// Any covered cell resolves to this location; the first in grid
    /// order is used.
    pub fn entry_cell(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    /// Whether `cell` belongs to this location.
    pub fn contains_cell(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Put a stack down here, merging it into an existing stack of the
    /// same kind.
    pub fn deposit(&mut self, stack: ItemStack) {
        if let Some(existing) = self.held.iter_mut().find(|held| held.kind == stack.kind) {
            existing.count = existing.count.saturating_add(stack.count);
        } else {
            self.held.push(stack);
        }
    }
}
