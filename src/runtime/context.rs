//! Shared simulation services
//!
//! One `SimulationContext` per simulation owns every cross-agent service
//! and is passed by reference into agents at creation. No ambient statics:
//! tests construct as many isolated contexts as they like.

use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::agent::AgentRegistry;
use crate::brain::{BrainLoader, GlobalBrain, INPUT_SIZE};
use crate::core::config::DecisionConfig;
use crate::core::types::AgentId;
use crate::difficulty::DifficultyController;
use crate::memory::persist::SnapshotStore;
use crate::memory::MemoryStore;
use crate::spatial::SpatialGrid;
use crate::squad::SquadCoordinator;

/// Shared count of who is engaging which target
///
/// Engage registers on enter and unregisters on exit; Flank reads the count
/// for crowd de-confliction.
#[derive(Debug, Default)]
pub struct EngagementRegistry {
    engaging: AHashMap<AgentId, Vec<AgentId>>,
}

impl EngagementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, attacker: AgentId, target: AgentId) {
        let attackers = self.engaging.entry(target).or_default();
        if !attackers.contains(&attacker) {
            attackers.push(attacker);
        }
    }

    pub fn unregister(&mut self, attacker: AgentId, target: AgentId) {
        if let Some(attackers) = self.engaging.get_mut(&target) {
            attackers.retain(|&a| a != attacker);
            if attackers.is_empty() {
                self.engaging.remove(&target);
            }
        }
    }

    /// Allies currently engaging `target`, excluding `asking`
    pub fn allies_on_target(&self, asking: AgentId, target: AgentId) -> usize {
        self.engaging
            .get(&target)
            .map(|attackers| attackers.iter().filter(|&&a| a != asking).count())
            .unwrap_or(0)
    }

    /// Drop every entry that references a gone agent
    pub fn purge_invalid(&mut self, registry: &AgentRegistry) {
        self.engaging.retain(|target, attackers| {
            attackers.retain(|&a| registry.resolve(a).is_some());
            registry.resolve(*target).is_some() && !attackers.is_empty()
        });
    }
}

/// Owner of all shared decision-core services
pub struct SimulationContext {
    pub config: DecisionConfig,
    pub registry: AgentRegistry,
    pub grid: SpatialGrid,
    pub memory: MemoryStore,
    pub engagements: EngagementRegistry,
    pub squads: SquadCoordinator,
    pub difficulty: DifficultyController,
    pub brain: GlobalBrain,
}

impl SimulationContext {
    /// Build a context for one map, loading persisted memory and the brain
    /// through the warm-up state machine
    pub fn new(config: DecisionConfig, store: &dyn SnapshotStore, map_name: &str, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let layers = vec![
            INPUT_SIZE,
            16,
            crate::actions::ActionKind::ALL.len(),
        ];
        let mut loader = BrainLoader::new(layers, config.brain_save_threshold);
        loader.poll(store, &mut rng);
        let brain = loader.take().expect("loader polls to Ready synchronously");

        Self {
            registry: AgentRegistry::new(),
            grid: SpatialGrid::new(config.grid_cell_size),
            memory: MemoryStore::load(store, map_name, &config),
            engagements: EngagementRegistry::new(),
            squads: SquadCoordinator::new(),
            difficulty: DifficultyController::new(config.difficulty_warmup),
            brain,
            config,
        }
    }

    /// Per-tick mutation-phase upkeep: rebuild the grid, drop stale
    /// references, decay memory
    pub fn begin_tick(&mut self, now: f32) {
        let positions: Vec<_> = self.registry.live_positions().collect();
        self.grid.rebuild(positions.into_iter());
        self.engagements.purge_invalid(&self.registry);
        self.squads.purge_invalid(&self.registry);
        self.memory.decay_and_prune(now, &self.config);
    }
}
