//! Clustered spot lists for stuck locations and ambush positions
//!
//! Nearby recordings merge into one spot instead of piling up duplicates.

use serde::{Deserialize, Serialize};

use crate::core::types::{Seconds, Vec3};

/// A remembered location with a hit count and freshness timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spot {
    pub position: Vec3,
    pub hits: u32,
    pub last_seen: Seconds,
}

/// Bounded spot list with merge-radius dedup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotList {
    spots: Vec<Spot>,
    capacity: usize,
    merge_radius: f32,
}

impl SpotList {
    pub fn new(capacity: usize, merge_radius: f32) -> Self {
        Self {
            spots: Vec::new(),
            capacity,
            merge_radius,
        }
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spot> {
        self.spots.iter()
    }

    /// Record a spot. A recording within the merge radius of an existing
    /// spot bumps that spot instead of adding a new one.
    pub fn record(&mut self, position: Vec3, now: Seconds) {
        if let Some(existing) = self
            .spots
            .iter_mut()
            .find(|s| s.position.distance(&position) <= self.merge_radius)
        {
            existing.hits += 1;
            existing.last_seen = now;
            // Drift the merged spot toward the newest observation
            existing.position = existing.position.lerp(&position, 0.25);
            return;
        }

        self.spots.push(Spot {
            position,
            hits: 1,
            last_seen: now,
        });

        if self.spots.len() > self.capacity {
            self.evict_oldest();
        }
    }

    /// Whether any known spot lies within `radius` of a position
    pub fn near(&self, position: Vec3, radius: f32) -> bool {
        self.spots
            .iter()
            .any(|s| s.position.distance(&position) <= radius)
    }

    /// Drop spots not refreshed within `max_age`
    pub fn prune(&mut self, now: Seconds, max_age: Seconds) {
        self.spots.retain(|s| now - s.last_seen <= max_age);
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self
            .spots
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.last_seen.total_cmp(&b.last_seen))
            .map(|(i, _)| i)
        {
            self.spots.remove(oldest);
        }
    }
}
