//! Per-agent work state: at most one active work item plus a FIFO queue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use stockcap_types::{AgentId, WorkItem, WorkItemId};

/// An agent's commitments, in the order it will carry them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentWork {
    /// The agent.
    pub id: AgentId,
    /// Display name used in logs.
    pub name: String,
    /// The work item being carried out right now.
    pub active: Option<WorkItem>,
    /// Work items waiting to start, front first.
    pub queue: VecDeque<WorkItem>,
}

impl AgentWork {
    /// Create an idle agent.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            active: None,
            queue: VecDeque::new(),
        }
    }

    /// Active item first, then the queue in order.
    pub fn work_items(&self) -> impl Iterator<Item = &WorkItem> {
        self.active.iter().chain(self.queue.iter())
    }

    /// Whether the agent has nothing active and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }

    /// Start `item` now, pushing any current work back to the queue front.
    pub fn assign(&mut self, item: WorkItem) {
        if let Some(current) = self.active.replace(item) {
            self.queue.push_front(current);
        }
    }

    /// Queue `item` behind everything already planned.
    pub fn enqueue(&mut self, item: WorkItem) {
        self.queue.push_back(item);
    }

    /// If nothing is active, start the next queued item.
    ///
    /// Returns whether the agent now has active work.
    pub fn promote_next(&mut self) -> bool {
        if self.active.is_none() {
            self.active = self.queue.pop_front();
        }
        self.active.is_some()
    }

    /// Finish or abandon the active item, handing it back.
    pub const fn take_active(&mut self) -> Option<WorkItem> {
        self.active.take()
    }

    /// Drop a work item wherever it sits, handing it back if found.
    pub fn cancel(&mut self, id: WorkItemId) -> Option<WorkItem> {
        if self.active.as_ref().is_some_and(|item| item.id == id) {
            return self.active.take();
        }
        let position = self.queue.iter().position(|item| item.id == id)?;
        self.queue.remove(position)
    }
}
