//! Registry of live agents with weak-handle validation
//!
//! Targets, squad members, and leaders are referenced by `AgentId` handles
//! into this registry. Any handle can go stale at any time; a lookup miss
//! means "gone" and is never an error.

use ahash::AHashMap;

use crate::core::types::{AgentId, Vec3};

/// Minimal live state other systems may read about an agent
#[derive(Debug, Clone)]
pub struct AgentRecord {
    pub id: AgentId,
    pub position: Vec3,
    pub health_fraction: f32,
    pub is_alive: bool,
}

/// Arena of live agents
#[derive(Debug, Default)]
pub struct AgentRegistry {
    records: AHashMap<AgentId, AgentRecord>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn register(&mut self, record: AgentRecord) {
        self.records.insert(record.id, record);
    }

    /// Remove an agent on death/despawn. Handles elsewhere simply start
    /// missing.
    pub fn unregister(&mut self, id: AgentId) {
        self.records.remove(&id);
    }

    /// Validate a weak handle. `None` means the agent is gone or dead.
    pub fn resolve(&self, id: AgentId) -> Option<&AgentRecord> {
        self.records.get(&id).filter(|r| r.is_alive)
    }

    pub fn resolve_mut(&mut self, id: AgentId) -> Option<&mut AgentRecord> {
        self.records.get_mut(&id).filter(|r| r.is_alive)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentRecord> {
        self.records.values()
    }

    /// Positions of all live agents, for spatial grid rebuilds
    pub fn live_positions(&self) -> impl Iterator<Item = (AgentId, Vec3)> + '_ {
        self.records
            .values()
            .filter(|r| r.is_alive)
            .map(|r| (r.id, r.position))
    }
}
