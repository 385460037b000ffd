//! Decaying danger heat map
//!
//! Danger events accumulate as weighted points that fade exponentially in
//! time and fall off as a Gaussian in space. Cover search minimizes heat;
//! rally point selection avoids it.

use serde::{Deserialize, Serialize};

use crate::core::types::{Seconds, Vec3};

/// Heat time constant: a lone event loses 1/e of its heat every tau seconds
const HEAT_TAU: f32 = 30.0;

/// One recorded danger occurrence (damage taken, ally down, grenade blast)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerEvent {
    pub position: Vec3,
    pub time: Seconds,
    pub weight: f32,
}

/// Bounded list of danger events with Gaussian-in-space, exponential-in-time
/// heat queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DangerHeatMap {
    events: Vec<DangerEvent>,
    capacity: usize,
}

impl DangerHeatMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Record a danger event. Oldest entries are evicted past capacity.
    pub fn mark_danger(&mut self, position: Vec3, time: Seconds, weight: f32) {
        self.events.push(DangerEvent {
            position,
            time,
            weight,
        });

        if self.events.len() > self.capacity {
            let overflow = self.events.len() - self.capacity;
            self.events.drain(0..overflow);
        }
    }

    /// Heat at a point: sum of weight * exp(-age/tau) * exp(-d^2 / 2 sigma^2)
    /// over all events. `sigma` controls how far a single event radiates.
    pub fn heat_at(&self, position: Vec3, now: Seconds, sigma: f32) -> f32 {
        let two_sigma_sq = 2.0 * sigma * sigma;

        self.events
            .iter()
            .map(|event| {
                let age = (now - event.time).max(0.0);
                let d = position.distance(&event.position);
                event.weight * (-age / HEAT_TAU).exp() * (-(d * d) / two_sigma_sq).exp()
            })
            .sum()
    }

    /// Drop events older than `max_age`
    pub fn decay_and_prune(&mut self, now: Seconds, max_age: Seconds) {
        self.events.retain(|event| now - event.time <= max_age);
    }
}

impl Default for DangerHeatMap {
    fn default() -> Self {
        Self::new(64)
    }
}
