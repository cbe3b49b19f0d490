//! Core value types shared between the capacity subsystem and its
//! collaborators.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::JobKind;
use crate::ids::{ItemId, PolicyId, ResourceKind, WorkItemId};

// ---------------------------------------------------------------------------
// Map cells
// ---------------------------------------------------------------------------

/// A cell on the map grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub z: i32,
}

impl Cell {
    /// Create a cell from its coordinates.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

// ---------------------------------------------------------------------------
// Item stacks
// ---------------------------------------------------------------------------

/// A physical stack of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemStack {
    /// Identity of this physical stack.
    pub id: ItemId,
    /// The resource held in the stack.
    pub kind: ResourceKind,
    /// Number of units in the stack.
    pub count: u32,
}

impl ItemStack {
    /// Create a fresh stack with a new identity.
    pub fn new(kind: ResourceKind, count: u32) -> Self {
        Self {
            id: ItemId::new(),
            kind,
            count,
        }
    }
}

// ---------------------------------------------------------------------------
// Work items
// ---------------------------------------------------------------------------

/// An agent's commitment to move a quantity of one resource kind.
///
/// `requested` is what the job asked for when it was created; the haul
/// target's stack count is what will actually arrive and may be smaller
/// (the agent could only pick up part of a stack).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorkItem {
    /// Identity of this work item.
    pub id: WorkItemId,
    /// What the job does with the stack.
    pub job: JobKind,
    /// The resource being moved.
    pub kind: ResourceKind,
    /// Nominal quantity asked for at creation.
    pub requested: u32,
    /// Destination cell, if the job has one.
    pub destination: Option<Cell>,
    /// The physical stack this job moves.
    pub haul_target: Option<ItemStack>,
}

impl WorkItem {
    /// Build a storage haul for `target` towards `destination`.
    ///
    /// The requested quantity starts at the target stack's size.
    pub fn haul_to_storage(target: ItemStack, destination: Cell) -> Self {
        Self {
            id: WorkItemId::new(),
            job: JobKind::HaulToStorage,
            kind: target.kind.clone(),
            requested: target.count,
            destination: Some(destination),
            haul_target: Some(target),
        }
    }

    /// Units physically committed by this work item.
    ///
    /// Zero when the job has no haul target.
    pub fn carried_count(&self) -> u32 {
        self.haul_target.as_ref().map_or(0, |stack| stack.count)
    }
}

// ---------------------------------------------------------------------------
// Limit entries
// ---------------------------------------------------------------------------

/// One configured limit: at most `limit` units of `kind` under `policy`.
///
/// This triple is the persistence and UI exchange format for the limit
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LimitEntry {
    /// The storage policy the limit belongs to.
    pub policy: PolicyId,
    /// The limited resource kind.
    pub kind: ResourceKind,
    /// Maximum quantity; always positive.
    pub limit: u32,
}
