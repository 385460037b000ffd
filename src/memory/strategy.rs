//! Named strategy weight table with bounded reinforcement
//!
//! Weights multiply rule scores for broad tactics ("flank_wide",
//! "suppress_first"). Rewards push a weight up or down, decay pulls all
//! weights back toward neutral, and recentering pulls them toward their
//! current mean so one runaway tactic cannot dominate forever.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Lower clamp for any strategy weight
const WEIGHT_MIN: f32 = 0.2;

/// Upper clamp for any strategy weight
const WEIGHT_MAX: f32 = 1.8;

/// Neutral value weights decay toward
const WEIGHT_NEUTRAL: f32 = 1.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyWeights {
    weights: AHashMap<String, f32>,
}

impl StrategyWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current multiplier for a named strategy (1.0 when unknown)
    pub fn get(&self, name: &str) -> f32 {
        self.weights.get(name).copied().unwrap_or(WEIGHT_NEUTRAL)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Shift a weight by `delta`, clamped into [0.2, 1.8]
    pub fn apply_reward(&mut self, name: &str, delta: f32) {
        let entry = self
            .weights
            .entry(name.to_string())
            .or_insert(WEIGHT_NEUTRAL);
        *entry = (*entry + delta).clamp(WEIGHT_MIN, WEIGHT_MAX);
    }

    /// Pull every weight toward neutral by blend factor `rate` in [0,1]
    pub fn decay_weights(&mut self, rate: f32) {
        let rate = rate.clamp(0.0, 1.0);
        for weight in self.weights.values_mut() {
            *weight += (WEIGHT_NEUTRAL - *weight) * rate;
        }
    }

    /// Pull every weight toward the current mean by blend factor `rate`
    pub fn recenter_weights(&mut self, rate: f32) {
        if self.weights.is_empty() {
            return;
        }
        let rate = rate.clamp(0.0, 1.0);
        let mean = self.weights.values().sum::<f32>() / self.weights.len() as f32;
        for weight in self.weights.values_mut() {
            *weight += (mean - *weight) * rate;
        }
    }
}
