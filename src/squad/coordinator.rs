//! Squad-level classification and order assignment
//!
//! Runs on a slower cadence than per-agent decisions. Each pass prunes
//! dead members, classifies every squad's tactical situation, and writes
//! per-member orders that agent evaluation may consult.

use ahash::AHashMap;
use tracing::debug;

use crate::agent::AgentRegistry;
use crate::core::types::{AgentId, Seconds, SquadId, Vec3};
use crate::memory::MemoryStore;
use crate::squad::{MemberOrder, Squad, SquadSituation};

/// Seconds between coordinator passes
const COORDINATION_INTERVAL: Seconds = 1.0;

/// Centroid-to-target distance bands for classification
const DISTANCE_FAR: f32 = 20.0;
const DISTANCE_CLOSE: f32 = 15.0;

/// Health bands for classification
const HEALTH_BROKEN: f32 = 0.3;
const HEALTH_STRONG: f32 = 0.7;

/// Alive members needed to press an attack
const STRENGTH_FOR_OFFENSE: usize = 3;

#[derive(Debug, Default)]
pub struct SquadCoordinator {
    squads: AHashMap<SquadId, Squad>,
    /// Reverse index, rebuilt on membership changes
    member_squad: AHashMap<AgentId, SquadId>,
    next_pass_at: Seconds,
}

impl SquadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_squad(&mut self, leader: AgentId, members: Vec<AgentId>) -> SquadId {
        let id = SquadId::new();
        let squad = Squad::new(id, leader, members);
        for &member in &squad.members {
            self.member_squad.insert(member, id);
        }
        self.squads.insert(id, squad);
        id
    }

    pub fn squad(&self, id: SquadId) -> Option<&Squad> {
        self.squads.get(&id)
    }

    pub fn squad_of(&self, agent: AgentId) -> Option<&Squad> {
        self.member_squad.get(&agent).and_then(|id| self.squads.get(id))
    }

    pub fn is_leader(&self, agent: AgentId) -> bool {
        self.squad_of(agent).map_or(false, |s| s.leader == agent)
    }

    /// Live squadmates of `agent`, excluding itself
    pub fn live_squadmates(&self, agent: AgentId, registry: &AgentRegistry) -> usize {
        self.squad_of(agent)
            .map_or(0, |s| s.live_count(registry).saturating_sub(1))
    }

    /// Current order for one member, if its squad has assigned any
    pub fn order_for(&self, agent: AgentId) -> Option<MemberOrder> {
        self.squad_of(agent).and_then(|s| s.orders.get(&agent).copied())
    }

    /// Point the squad's classification at a focus position
    pub fn set_target(&mut self, id: SquadId, target: Option<Vec3>) {
        if let Some(squad) = self.squads.get_mut(&id) {
            squad.target = target;
        }
    }

    /// Drop references to gone agents and dissolve emptied squads
    pub fn purge_invalid(&mut self, registry: &AgentRegistry) {
        self.squads.retain(|_, squad| squad.prune(registry));
        self.member_squad
            .retain(|agent, id| match self.squads.get(id) {
                Some(squad) => squad.members.contains(agent),
                None => false,
            });
    }

    /// Coordinator pass, throttled to its own cadence
    pub fn tick(&mut self, registry: &AgentRegistry, memory: &mut MemoryStore, now: Seconds) {
        if now < self.next_pass_at {
            return;
        }
        self.next_pass_at = now + COORDINATION_INTERVAL;

        self.purge_invalid(registry);
        for squad in self.squads.values_mut() {
            classify_and_assign(squad, registry);

            // Each pass drifts the leader's formation preferences toward
            // what the squad is living through. Sustained health loss
            // stands in for incoming pressure at squad scale.
            let alive = squad.live_count(registry);
            let pressure = (1.0 - squad.average_health(registry)) * 4.0;
            memory.adapt_leader_prefs(squad.leader, alive, pressure, now);
        }
    }
}

/// Classify one squad and rewrite its member orders
fn classify_and_assign(squad: &mut Squad, registry: &AgentRegistry) {
    let average_health = squad.average_health(registry);
    let alive = squad.live_count(registry);
    let distance = match (squad.centroid(registry), squad.target) {
        (Some(centroid), Some(target)) => Some(centroid.distance(&target)),
        _ => None,
    };

    // First matching rule wins
    let situation = if average_health < HEALTH_BROKEN {
        SquadSituation::Retreating
    } else {
        match distance {
            Some(d) if average_health > HEALTH_STRONG
                && alive >= STRENGTH_FOR_OFFENSE
                && d > DISTANCE_FAR =>
            {
                SquadSituation::Advancing
            }
            Some(_) if average_health > HEALTH_STRONG && alive >= STRENGTH_FOR_OFFENSE => {
                SquadSituation::Flanking
            }
            Some(d) if d < DISTANCE_CLOSE => SquadSituation::Defending,
            _ => SquadSituation::Standard,
        }
    };

    if situation != squad.situation {
        debug!(squad = ?squad.id, from = ?squad.situation, to = ?situation, "squad reclassified");
    }
    squad.situation = situation;

    squad.orders.clear();
    for (index, &member) in squad.members.iter().enumerate() {
        if registry.resolve(member).is_none() {
            continue;
        }
        let order = match situation {
            SquadSituation::Advancing => match index {
                0 => MemberOrder::Engage,
                1 => MemberOrder::Flank,
                _ => MemberOrder::SuppressingFire,
            },
            SquadSituation::Flanking => match index {
                0 => MemberOrder::Engage,
                i if i % 2 == 0 => MemberOrder::FlankLeft,
                _ => MemberOrder::FlankRight,
            },
            SquadSituation::Retreating => MemberOrder::Retreat,
            SquadSituation::Defending => MemberOrder::HoldPosition,
            SquadSituation::Standard => continue,
        };
        squad.orders.insert(member, order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRecord;
    use crate::core::config::DecisionConfig;
    use crate::squad::Formation;

    fn memory() -> MemoryStore {
        MemoryStore::new(&DecisionConfig::default())
    }

    fn spawn(registry: &mut AgentRegistry, position: Vec3, health: f32) -> AgentId {
        let id = AgentId::new();
        registry.register(AgentRecord {
            id,
            position,
            health_fraction: health,
            is_alive: true,
        });
        id
    }

    fn squad_of_four(
        registry: &mut AgentRegistry,
        coordinator: &mut SquadCoordinator,
        health: f32,
    ) -> (SquadId, Vec<AgentId>) {
        let members: Vec<_> = (0..4)
            .map(|i| spawn(registry, Vec3::new(i as f32, 0.0, 0.0), health))
            .collect();
        let id = coordinator.create_squad(members[0], members[1..].to_vec());
        (id, members)
    }

    #[test]
    fn test_healthy_distant_squad_advances_in_wedge() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (id, members) = squad_of_four(&mut registry, &mut coordinator, 0.8);

        coordinator.set_target(id, Some(Vec3::new(30.0, 0.0, 0.0)));
        coordinator.tick(&registry, &mut memory(), 0.0);

        let squad = coordinator.squad(id).unwrap();
        assert_eq!(squad.situation, SquadSituation::Advancing);
        assert_eq!(squad.formation(), Formation::Wedge);
        assert_eq!(squad.orders[&members[0]], MemberOrder::Engage);
        assert_eq!(squad.orders[&members[1]], MemberOrder::Flank);
        assert_eq!(squad.orders[&members[2]], MemberOrder::SuppressingFire);
        assert_eq!(squad.orders[&members[3]], MemberOrder::SuppressingFire);
    }

    #[test]
    fn test_close_healthy_squad_flanks_alternating_sides() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (id, members) = squad_of_four(&mut registry, &mut coordinator, 0.9);

        coordinator.set_target(id, Some(Vec3::new(10.0, 0.0, 0.0)));
        coordinator.tick(&registry, &mut memory(), 0.0);

        let squad = coordinator.squad(id).unwrap();
        assert_eq!(squad.situation, SquadSituation::Flanking);
        assert_eq!(squad.formation(), Formation::Line);
        assert_eq!(squad.orders[&members[0]], MemberOrder::Engage);
        assert_eq!(squad.orders[&members[1]], MemberOrder::FlankRight);
        assert_eq!(squad.orders[&members[2]], MemberOrder::FlankLeft);
        assert_eq!(squad.orders[&members[3]], MemberOrder::FlankRight);
    }

    #[test]
    fn test_broken_squad_retreats_regardless_of_target() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (id, members) = squad_of_four(&mut registry, &mut coordinator, 0.2);

        coordinator.set_target(id, Some(Vec3::new(30.0, 0.0, 0.0)));
        coordinator.tick(&registry, &mut memory(), 0.0);

        let squad = coordinator.squad(id).unwrap();
        assert_eq!(squad.situation, SquadSituation::Retreating);
        assert_eq!(squad.formation(), Formation::Column);
        for member in &members {
            assert_eq!(squad.orders[member], MemberOrder::Retreat);
        }
    }

    #[test]
    fn test_no_target_is_standard_with_no_orders() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (id, _) = squad_of_four(&mut registry, &mut coordinator, 0.8);

        coordinator.tick(&registry, &mut memory(), 0.0);

        let squad = coordinator.squad(id).unwrap();
        assert_eq!(squad.situation, SquadSituation::Standard);
        assert!(squad.orders.is_empty());
    }

    #[test]
    fn test_dead_leader_promotes_first_member() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (id, members) = squad_of_four(&mut registry, &mut coordinator, 0.8);

        registry.unregister(members[0]);
        coordinator.purge_invalid(&registry);

        let squad = coordinator.squad(id).unwrap();
        assert_eq!(squad.leader, members[1]);
        assert!(coordinator.is_leader(members[1]));
    }

    #[test]
    fn test_empty_squad_dissolves() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (id, members) = squad_of_four(&mut registry, &mut coordinator, 0.8);

        for member in &members {
            registry.unregister(*member);
        }
        coordinator.purge_invalid(&registry);

        assert!(coordinator.squad(id).is_none());
        assert!(coordinator.squad_of(members[0]).is_none());
    }

    #[test]
    fn test_coordination_cadence_throttles_passes() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (id, _) = squad_of_four(&mut registry, &mut coordinator, 0.8);
        let mut memory = memory();

        coordinator.tick(&registry, &mut memory, 0.0);
        coordinator.set_target(id, Some(Vec3::new(30.0, 0.0, 0.0)));

        // Within the cadence window: classification does not move yet
        coordinator.tick(&registry, &mut memory, 0.5);
        assert_eq!(coordinator.squad(id).unwrap().situation, SquadSituation::Standard);

        coordinator.tick(&registry, &mut memory, 1.0);
        assert_eq!(coordinator.squad(id).unwrap().situation, SquadSituation::Advancing);
    }

    #[test]
    fn test_passes_adapt_leader_formation_prefs() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let mut memory = memory();

        // Wounded squad: the leader should learn to spread out
        let members: Vec<_> = (0..3)
            .map(|i| spawn(&mut registry, Vec3::new(0.0, 0.0, i as f32), 0.3))
            .collect();
        coordinator.create_squad(members[0], members[1..].to_vec());

        let baseline = memory.leader_prefs(members[0]).base_radius;
        for pass in 0..10 {
            coordinator.tick(&registry, &mut memory, pass as f32);
        }

        assert!(memory.leader_prefs(members[0]).base_radius > baseline);
    }

    #[test]
    fn test_live_squadmates_excludes_self_and_dead() {
        let mut registry = AgentRegistry::new();
        let mut coordinator = SquadCoordinator::new();
        let (_, members) = squad_of_four(&mut registry, &mut coordinator, 0.8);

        assert_eq!(coordinator.live_squadmates(members[0], &registry), 3);
        registry.unregister(members[3]);
        assert_eq!(coordinator.live_squadmates(members[0], &registry), 2);
    }
}
