//! Decision core configuration with documented constants
//!
//! All tuned numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};

/// Configuration for the decision core
///
/// These values have been tuned against skirmish playtests. Changing them
/// shifts how often agents commit, hesitate, and rotate between actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    // === CADENCE ===
    /// Seconds between decision re-evaluations (10 Hz)
    ///
    /// Execution of the committed action still runs every frame; only the
    /// choice of action is re-made at this cadence.
    pub decision_interval: f32,

    // === STABILITY ===
    /// Minimum seconds an action stays active before a non-forced switch
    pub min_dwell: f32,

    /// Score margin a challenger must beat the current action by to switch
    /// inside the dwell window
    pub switch_margin: f32,

    /// Seconds a just-exited action is excluded from re-selection
    ///
    /// Prevents oscillation between two similarly-scored actions.
    pub switch_cooldown: f32,

    /// Seconds all re-evaluation is blocked after an actual switch, so the
    /// new action gets an uninterrupted commit
    pub global_decision_cooldown: f32,

    // === NEURAL BLEND ===
    /// Neural blend weight at spawn
    pub neural_weight_floor: f32,

    /// Neural blend weight cap once the ramp completes
    pub neural_weight_cap: f32,

    /// Seconds of agent lifetime over which the blend weight ramps from
    /// floor to cap
    pub neural_ramp_duration: f32,

    /// Fitness an episode must exceed before the shared brain is persisted
    pub brain_save_threshold: f32,

    // === MEMORY BOUNDS ===
    /// Danger heat events retained (oldest evicted past this)
    pub max_danger_events: usize,

    /// Stuck spots retained
    pub max_stuck_spots: usize,

    /// Ambush spots retained
    pub max_ambush_spots: usize,

    /// Approach-outcome cells retained
    pub max_approach_stats: usize,

    /// Leader formation preferences retained
    pub max_leader_prefs: usize,

    // === MEMORY DECAY ===
    /// Heat time constant in seconds: heat falls by 1/e every tau
    pub heat_tau: f32,

    /// Seconds after which a danger event is pruned outright
    pub heat_max_age: f32,

    /// Recency decay constant for approach statistics (seconds)
    pub approach_decay: f32,

    /// Merge radius for stuck/ambush spot dedup (meters)
    pub spot_merge_radius: f32,

    // === SPATIAL ===
    /// Spatial hash cell size in meters
    ///
    /// Matches separation / crowding query ranges: a 3x3 neighborhood at
    /// 10 m cells covers the 15 m crowd radius used by squad gathering.
    pub grid_cell_size: f32,

    // === DIFFICULTY ===
    /// Seconds of session warm-up before difficulty starts reacting
    pub difficulty_warmup: f32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            decision_interval: 0.1,

            min_dwell: 2.0,
            switch_margin: 0.3,
            switch_cooldown: 3.0,
            global_decision_cooldown: 1.0,

            neural_weight_floor: 0.1,
            neural_weight_cap: 0.4,
            neural_ramp_duration: 300.0,
            brain_save_threshold: 500.0,

            max_danger_events: 64,
            max_stuck_spots: 128,
            max_ambush_spots: 32,
            max_approach_stats: 120,
            max_leader_prefs: 256,

            heat_tau: 30.0,
            heat_max_age: 180.0,
            approach_decay: 120.0,
            spot_merge_radius: 2.0,

            grid_cell_size: 10.0,

            difficulty_warmup: 60.0,
        }
    }
}

impl DecisionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.decision_interval <= 0.0 {
            return Err("decision_interval must be positive".into());
        }

        if self.neural_weight_floor > self.neural_weight_cap {
            return Err(format!(
                "neural_weight_floor ({}) should be <= neural_weight_cap ({})",
                self.neural_weight_floor, self.neural_weight_cap
            ));
        }

        if self.neural_weight_cap > 1.0 {
            return Err("neural_weight_cap must not exceed 1.0".into());
        }

        // Dwell shorter than the switch cooldown would let a rejected
        // challenger win by attrition
        if self.switch_cooldown < self.min_dwell {
            return Err(format!(
                "switch_cooldown ({}) should be >= min_dwell ({})",
                self.switch_cooldown, self.min_dwell
            ));
        }

        if self.heat_tau <= 0.0 || self.approach_decay <= 0.0 {
            return Err("Decay constants must be positive".into());
        }

        Ok(())
    }
}
