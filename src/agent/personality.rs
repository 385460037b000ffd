//! Per-agent personality traits
//!
//! Rolled once at spawn and immutable afterwards. Presets can be loaded
//! from TOML to bias the roll for named archetypes.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Behavioral traits, each in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Personality {
    /// Tendency to push fights (0.0 = passive, 1.0 = reckless)
    pub aggression: f32,
    /// Tendency to avoid risk and prefer cover
    pub caution: f32,
    /// Tendency to stay with the squad and follow orders
    pub teamwork: f32,
    /// Tendency to chase loot and downed-enemy positions
    pub greed: f32,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            aggression: 0.5,
            caution: 0.5,
            teamwork: 0.5,
            greed: 0.5,
        }
    }
}

impl Personality {
    /// Roll a fresh personality
    pub fn roll(rng: &mut impl Rng) -> Self {
        Self {
            aggression: rng.gen_range(0.0..=1.0),
            caution: rng.gen_range(0.0..=1.0),
            teamwork: rng.gen_range(0.0..=1.0),
            greed: rng.gen_range(0.0..=1.0),
        }
    }

    /// Roll around a preset, jittered by +/- 0.15 and clamped
    pub fn roll_around(preset: &Personality, rng: &mut impl Rng) -> Self {
        fn jitter(base: f32, rng: &mut impl Rng) -> f32 {
            (base + rng.gen_range(-0.15..=0.15)).clamp(0.0, 1.0)
        }
        Self {
            aggression: jitter(preset.aggression, rng),
            caution: jitter(preset.caution, rng),
            teamwork: jitter(preset.teamwork, rng),
            greed: jitter(preset.greed, rng),
        }
    }

    /// Parse a named preset from TOML
    pub fn from_toml(contents: &str) -> crate::core::error::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
