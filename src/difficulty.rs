//! Dynamic difficulty from observed player performance
//!
//! The controller watches player kills-per-minute and damage-taken-per-
//! minute, folds them into a single score, and derives four multipliers.
//! It never applies them itself; the rule scorer and aim logic read them.

use tracing::debug;

use crate::core::types::Seconds;

/// Score bounds
const SCORE_MIN: f32 = 0.5;
const SCORE_MAX: f32 = 2.5;

/// Per-minute kill rates that bump the score
const KPM_HIGH: f32 = 5.0;
const KPM_VERY_HIGH: f32 = 10.0;
const KPM_LOW: f32 = 2.0;

/// Per-minute damage-taken rates
const DPM_LOW: f32 = 50.0;
const DPM_HIGH: f32 = 200.0;

/// Watches session performance and derives scorer multipliers
#[derive(Debug, Clone)]
pub struct DifficultyController {
    warmup: Seconds,
    session_start: Seconds,
    elapsed: Seconds,
    kills: u32,
    damage_taken: f32,
    score: f32,
}

impl DifficultyController {
    pub fn new(warmup: Seconds) -> Self {
        Self {
            warmup,
            session_start: 0.0,
            elapsed: 0.0,
            kills: 0,
            damage_taken: 0.0,
            score: 1.0,
        }
    }

    /// Restart observation, keeping the warm-up requirement
    pub fn reset(&mut self, now: Seconds) {
        self.session_start = now;
        self.elapsed = 0.0;
        self.kills = 0;
        self.damage_taken = 0.0;
        self.score = 1.0;
    }

    pub fn record_player_kill(&mut self) {
        self.kills += 1;
    }

    pub fn record_player_damage_taken(&mut self, amount: f32) {
        self.damage_taken += amount.max(0.0);
    }

    /// Recompute the score from observed rates. Inert during warm-up.
    pub fn update(&mut self, now: Seconds) {
        self.elapsed = (now - self.session_start).max(0.0);
        if self.elapsed < self.warmup {
            return;
        }

        let minutes = self.elapsed / 60.0;
        if minutes <= 0.0 {
            // Zero warm-up at session start: no observation window yet
            return;
        }
        let kpm = self.kills as f32 / minutes;
        let dpm = self.damage_taken / minutes;

        let mut score: f32 = 1.0;
        if kpm > KPM_HIGH {
            score += 0.5;
        }
        if kpm > KPM_VERY_HIGH {
            score += 0.5;
        }
        if dpm < DPM_LOW {
            score += 0.3;
        }
        if kpm < KPM_LOW && dpm > DPM_HIGH {
            score -= 0.4;
        }

        let score = score.clamp(SCORE_MIN, SCORE_MAX);
        if (score - self.score).abs() > f32::EPSILON {
            debug!(kpm, dpm, score, "difficulty score moved");
        }
        self.score = score;
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Offensive-score multiplier for the rule scorer
    pub fn aggression_multiplier(&self) -> f32 {
        self.lerp(0.8, 1.5)
    }

    /// Reaction-delay multiplier; lower means faster reactions
    pub fn reaction_multiplier(&self) -> f32 {
        self.lerp(1.2, 0.7)
    }

    /// Aim-spread multiplier; lower means tighter spread
    pub fn accuracy_multiplier(&self) -> f32 {
        self.lerp(1.2, 0.8)
    }

    /// Outgoing-damage multiplier
    pub fn damage_multiplier(&self) -> f32 {
        self.lerp(0.9, 1.3)
    }

    fn lerp(&self, at_min: f32, at_max: f32) -> f32 {
        let t = (self.score - SCORE_MIN) / (SCORE_MAX - SCORE_MIN);
        at_min + (at_max - at_min) * t
    }
}
