//! Agent Registry
//!
//! Owns every live agent record together with its roster profile and the
//! timer handles its loops hold.

use std::collections::BTreeMap;

use temple_events::AgentId;

use crate::agent::{AgentRecord, RosterEntry};
use crate::timers::{TimerId, TimerQueue};

/// Work a timer does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Wander loop tick for one agent
    Wander(AgentId),
    /// A move has reached its end time
    MoveComplete(AgentId),
    /// Post-landing pause is over
    Settle(AgentId),
    /// Session-wide status randomization
    StatusTick,
}

/// Timer handles owned by one agent. At most one of each kind is armed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentTasks {
    pub wander: Option<TimerId>,
    pub completion: Option<TimerId>,
    pub settle: Option<TimerId>,
}

impl AgentTasks {
    /// Cancels every armed handle. Returns how many were still pending.
    pub fn release(&mut self, timers: &mut TimerQueue<TimerEvent>) -> usize {
        [self.wander.take(), self.completion.take(), self.settle.take()]
            .into_iter()
            .flatten()
            .filter(|id| timers.cancel(*id).is_some())
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct AgentEntry {
    pub profile: RosterEntry,
    pub record: AgentRecord,
    pub tasks: AgentTasks,
}

/// Live agents keyed by id. Iteration order is id order, which keeps seeded
/// runs reproducible.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    entries: BTreeMap<AgentId, AgentEntry>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Returns it back if the id is already taken.
    pub fn insert(&mut self, entry: AgentEntry) -> Result<(), AgentEntry> {
        let id = entry.record.id().clone();
        if self.entries.contains_key(&id) {
            return Err(entry);
        }
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn remove(&mut self, id: &AgentId) -> Option<AgentEntry> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &AgentId) -> Option<&AgentEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut AgentEntry> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentEntry> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AgentEntry> {
        self.entries.values_mut()
    }
}
