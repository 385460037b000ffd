//! Persistent spatial memory shared by all agents
//!
//! Split into a session-global half (strategy weights, leader preferences)
//! and a per-map half (danger heat, spots, approach stats), persisted as
//! two independent snapshots. All mutation happens on the simulation
//! thread; agents only read during the decision phase.

use serde::{Deserialize, Serialize};

use crate::core::config::DecisionConfig;
use crate::core::types::{AgentId, Seconds, Vec3};
use crate::memory::approach::ApproachStats;
use crate::memory::heat::DangerHeatMap;
use crate::memory::leader::{FormationPrefs, LeaderPrefs};
use crate::memory::persist::{self, map_key, SnapshotStore, KEY_GLOBAL};
use crate::memory::spots::SpotList;
use crate::memory::strategy::StrategyWeights;

/// Memory that survives across maps within a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMemory {
    pub strategy: StrategyWeights,
    pub leader_prefs: LeaderPrefs,
}

/// Memory tied to one map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapMemory {
    pub danger: DangerHeatMap,
    pub stuck_spots: SpotList,
    pub ambush_spots: SpotList,
    pub approaches: ApproachStats,
}

/// Seconds between maintenance passes; decay rates are tuned per-pass
const MAINTENANCE_INTERVAL: Seconds = 1.0;

/// The shared memory store
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub global: GlobalMemory,
    pub map: MapMemory,
    next_maintenance_at: Seconds,
}

impl GlobalMemory {
    fn fresh(config: &DecisionConfig) -> Self {
        Self {
            strategy: StrategyWeights::new(),
            leader_prefs: LeaderPrefs::new(config.max_leader_prefs),
        }
    }
}

impl MapMemory {
    fn fresh(config: &DecisionConfig) -> Self {
        Self {
            danger: DangerHeatMap::new(config.max_danger_events),
            stuck_spots: SpotList::new(config.max_stuck_spots, config.spot_merge_radius),
            ambush_spots: SpotList::new(config.max_ambush_spots, config.spot_merge_radius),
            approaches: ApproachStats::new(config.max_approach_stats),
        }
    }
}

impl MemoryStore {
    pub fn new(config: &DecisionConfig) -> Self {
        Self {
            global: GlobalMemory::fresh(config),
            map: MapMemory::fresh(config),
            next_maintenance_at: 0.0,
        }
    }

    /// Session-start load: the global half and the named map's half come
    /// from independent snapshots, each falling back to fresh defaults
    pub fn load(store: &dyn SnapshotStore, map_name: &str, config: &DecisionConfig) -> Self {
        Self {
            global: persist::load_or_default(store, KEY_GLOBAL, || GlobalMemory::fresh(config)),
            map: persist::load_or_default(store, &map_key(map_name), || MapMemory::fresh(config)),
            next_maintenance_at: 0.0,
        }
    }

    /// Teardown save of both halves; failures are logged, never fatal
    pub fn save(&self, store: &mut dyn SnapshotStore, map_name: &str) {
        persist::save_snapshot(store, KEY_GLOBAL, &self.global);
        persist::save_snapshot(store, &map_key(map_name), &self.map);
    }

    // === Danger heat ===

    pub fn mark_danger(&mut self, position: Vec3, now: Seconds, weight: f32) {
        self.map.danger.mark_danger(position, now, weight);
    }

    pub fn heat_at(&self, position: Vec3, now: Seconds, radius: f32) -> f32 {
        self.map.danger.heat_at(position, now, radius)
    }

    // === Spots ===

    pub fn mark_stuck(&mut self, position: Vec3, now: Seconds) {
        self.map.stuck_spots.record(position, now);
    }

    pub fn mark_ambush(&mut self, position: Vec3, now: Seconds) {
        self.map.ambush_spots.record(position, now);
    }

    pub fn near_stuck_spot(&self, position: Vec3, radius: f32) -> bool {
        self.map.stuck_spots.near(position, radius)
    }

    pub fn near_ambush_spot(&self, position: Vec3, radius: f32) -> bool {
        self.map.ambush_spots.near(position, radius)
    }

    // === Approaches ===

    pub fn record_approach_outcome(&mut self, point: Vec3, success: bool, now: Seconds) {
        self.map.approaches.record_outcome(point, success, now);
    }

    pub fn approach_weight(&self, point: Vec3, now: Seconds) -> f32 {
        self.map.approaches.approach_weight(point, now)
    }

    // === Strategies ===

    pub fn reward_strategy(&mut self, name: &str, delta: f32) {
        self.global.strategy.apply_reward(name, delta);
    }

    pub fn strategy_weight(&self, name: &str) -> f32 {
        self.global.strategy.get(name)
    }

    // === Leaders ===

    pub fn leader_prefs(&mut self, leader: AgentId) -> FormationPrefs {
        self.global.leader_prefs.get(leader)
    }

    pub fn adapt_leader_prefs(
        &mut self,
        leader: AgentId,
        local_density: usize,
        pressure: f32,
        now: Seconds,
    ) {
        self.global
            .leader_prefs
            .adapt(leader, local_density, pressure, now);
    }

    // === Maintenance ===

    /// Periodic decay and prune pass, run on the mutation phase of the
    /// tick but throttled to its own cadence so per-pass decay rates do
    /// not compound with the frame rate
    pub fn decay_and_prune(&mut self, now: Seconds, config: &DecisionConfig) {
        if now < self.next_maintenance_at {
            return;
        }
        self.next_maintenance_at = now + MAINTENANCE_INTERVAL;

        self.map.danger.decay_and_prune(now, config.heat_max_age);
        self.map.stuck_spots.prune(now, 600.0);
        self.map.ambush_spots.prune(now, 600.0);
        self.global.strategy.decay_weights(0.02);
        self.global.strategy.recenter_weights(0.005);
    }
}
