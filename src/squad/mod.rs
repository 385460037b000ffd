//! Squad grouping and tactical vocabulary
//!
//! Membership is weak: agents are referenced by id and validated against
//! the registry on every coordinator pass. A squad never keeps a dead
//! member alive in its books.

pub mod coordinator;

pub use coordinator::SquadCoordinator;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::agent::AgentRegistry;
use crate::core::types::{AgentId, SquadId, Vec3};

/// Tactical read on one squad, re-classified on the coordinator cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SquadSituation {
    Retreating,
    Advancing,
    Flanking,
    Defending,
    Standard,
}

/// Advisory movement shape for the squad's current situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formation {
    Wedge,
    Circle,
    Line,
    Column,
    Loose,
}

impl SquadSituation {
    /// Formation label is metadata for movement, not enforced geometry
    pub fn formation(self) -> Formation {
        match self {
            SquadSituation::Advancing => Formation::Wedge,
            SquadSituation::Defending => Formation::Circle,
            SquadSituation::Flanking => Formation::Line,
            SquadSituation::Retreating => Formation::Column,
            SquadSituation::Standard => Formation::Loose,
        }
    }
}

/// Order a coordinator hands to one member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberOrder {
    Engage,
    Flank,
    FlankLeft,
    FlankRight,
    SuppressingFire,
    Retreat,
    HoldPosition,
}

/// One squad's books: leader, weak member handles, current orders
#[derive(Debug, Clone)]
pub struct Squad {
    pub id: SquadId,
    pub leader: AgentId,
    /// Member ids in assignment order; the leader is always index 0
    pub members: Vec<AgentId>,
    pub orders: AHashMap<AgentId, MemberOrder>,
    pub situation: SquadSituation,
    /// Focus position the squad is fighting over, if any
    pub target: Option<Vec3>,
}

impl Squad {
    pub fn new(id: SquadId, leader: AgentId, mut members: Vec<AgentId>) -> Self {
        members.retain(|&m| m != leader);
        members.insert(0, leader);
        Self {
            id,
            leader,
            members,
            orders: AHashMap::new(),
            situation: SquadSituation::Standard,
            target: None,
        }
    }

    pub fn formation(&self) -> Formation {
        self.situation.formation()
    }

    /// Live centroid of resolvable members
    pub fn centroid(&self, registry: &AgentRegistry) -> Option<Vec3> {
        let mut sum = Vec3::default();
        let mut count = 0;
        for &member in &self.members {
            if let Some(record) = registry.resolve(member) {
                sum = sum + record.position;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum * (1.0 / count as f32))
        }
    }

    /// Average health fraction across resolvable members
    pub fn average_health(&self, registry: &AgentRegistry) -> f32 {
        let mut sum = 0.0;
        let mut count = 0;
        for &member in &self.members {
            if let Some(record) = registry.resolve(member) {
                sum += record.health_fraction;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    pub fn live_count(&self, registry: &AgentRegistry) -> usize {
        self.members
            .iter()
            .filter(|&&m| registry.resolve(m).is_some())
            .count()
    }

    /// Drop gone members; promote a new leader when needed. Returns false
    /// when the squad has emptied out and should be removed.
    pub fn prune(&mut self, registry: &AgentRegistry) -> bool {
        self.members.retain(|&m| registry.resolve(m).is_some());
        self.orders.retain(|m, _| registry.resolve(*m).is_some());

        if self.members.is_empty() {
            return false;
        }
        if registry.resolve(self.leader).is_none() {
            self.leader = self.members[0];
        }
        true
    }
}
