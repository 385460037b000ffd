//! Per-tick snapshot of one agent's sensed world state
//!
//! Rebuilt each evaluation tick from registry + collaborator queries and
//! consumed by both the rule scorer and the neural scorer. The context
//! never owns target lifetime; the target handle is validated on access.

use crate::agent::personality::Personality;
use crate::core::types::{AgentId, Seconds, Vec3};

/// Pressure lost per second with no incoming damage
const PRESSURE_DECAY_PER_SECOND: f32 = 0.5;

/// Pressure ceiling
const PRESSURE_MAX: f32 = 5.0;

/// One agent's decision-relevant view of the world
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub self_id: AgentId,
    pub position: Vec3,

    // === Target ===
    /// Weak target handle; `None` means no target or target invalidated
    pub target: Option<AgentId>,
    pub target_position: Option<Vec3>,
    pub target_distance: f32,
    pub target_direction: Vec3,
    pub has_line_of_sight: bool,
    pub last_seen_time: Option<Seconds>,
    pub last_seen_position: Option<Vec3>,
    /// Target health fraction when known, 1.0 otherwise
    pub target_health_fraction: f32,

    // === Self state ===
    pub health_fraction: f32,
    pub ammo_fraction: f32,
    /// Accumulated recent incoming damage, decays continuously
    pub pressure: f32,
    pub personality: Personality,

    // === Flags ===
    pub is_hurt: bool,
    pub is_low_ammo: bool,
    pub is_reloading: bool,
    pub is_stuck: bool,
    pub can_chase: bool,
    pub has_ranged_weapon: bool,
    pub has_healing_item: bool,
    pub has_throwable: bool,

    // === Squad ===
    /// Order assigned by the squad coordinator, if any
    pub squad_order: Option<crate::squad::MemberOrder>,
    pub is_squad_leader: bool,
    pub live_squadmates: usize,
    /// Allies currently engaging the same target (from the shared registry)
    pub allies_on_target: usize,
}

impl AgentContext {
    pub fn new(self_id: AgentId, position: Vec3, personality: Personality) -> Self {
        Self {
            self_id,
            position,
            target: None,
            target_position: None,
            target_distance: f32::MAX,
            target_direction: Vec3::default(),
            has_line_of_sight: false,
            last_seen_time: None,
            last_seen_position: None,
            target_health_fraction: 1.0,
            health_fraction: 1.0,
            ammo_fraction: 1.0,
            pressure: 0.0,
            personality,
            is_hurt: false,
            is_low_ammo: false,
            is_reloading: false,
            is_stuck: false,
            can_chase: false,
            has_ranged_weapon: true,
            has_healing_item: true,
            has_throwable: false,
            squad_order: None,
            is_squad_leader: false,
            live_squadmates: 0,
            allies_on_target: 0,
        }
    }

    /// Seconds since the target was last seen, or `None` if never seen
    pub fn time_since_seen(&self, now: Seconds) -> Option<Seconds> {
        self.last_seen_time.map(|t| (now - t).max(0.0))
    }

    /// Register incoming damage as pressure
    pub fn add_pressure(&mut self, amount: f32) {
        self.pressure = (self.pressure + amount).min(PRESSURE_MAX);
    }

    /// Continuous pressure decay, called once per frame
    pub fn decay_pressure(&mut self, dt: Seconds) {
        self.pressure = (self.pressure - PRESSURE_DECAY_PER_SECOND * dt).max(0.0);
    }

    /// Mark the target as sighted at `now`
    pub fn note_sighting(&mut self, position: Vec3, now: Seconds) {
        self.has_line_of_sight = true;
        self.last_seen_time = Some(now);
        self.last_seen_position = Some(position);
    }

    /// Drop the target reference (invalidated or dead)
    pub fn clear_target(&mut self) {
        self.target = None;
        self.target_position = None;
        self.target_distance = f32::MAX;
        self.has_line_of_sight = false;
        self.target_health_fraction = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AgentContext {
        AgentContext::new(AgentId::new(), Vec3::default(), Personality::default())
    }

    #[test]
    fn test_pressure_accumulates_and_caps() {
        let mut ctx = context();
        for _ in 0..10 {
            ctx.add_pressure(1.0);
        }
        assert!((ctx.pressure - PRESSURE_MAX).abs() < 0.001);
    }

    #[test]
    fn test_pressure_decays_to_zero() {
        let mut ctx = context();
        ctx.add_pressure(1.0);
        for _ in 0..100 {
            ctx.decay_pressure(0.1);
        }
        assert_eq!(ctx.pressure, 0.0);
    }

    #[test]
    fn test_time_since_seen() {
        let mut ctx = context();
        assert!(ctx.time_since_seen(10.0).is_none());

        ctx.note_sighting(Vec3::new(5.0, 0.0, 5.0), 10.0);
        assert_eq!(ctx.time_since_seen(13.0), Some(3.0));
    }

    #[test]
    fn test_clear_target_resets_sight_state() {
        let mut ctx = context();
        ctx.target = Some(AgentId::new());
        ctx.note_sighting(Vec3::default(), 1.0);

        ctx.clear_target();
        assert!(ctx.target.is_none());
        assert!(!ctx.has_line_of_sight);
        // Last-seen memory survives target invalidation for search behavior
        assert!(ctx.last_seen_position.is_some());
    }
}
