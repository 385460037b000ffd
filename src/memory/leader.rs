//! Per-leader adaptive formation preferences
//!
//! Each squad leader drifts toward formation parameters that match what
//! their squad keeps experiencing: tight spacing under crowding, wider
//! spread under fire. Lookups go through an index cache because the same
//! leader is queried every coordination pass.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Seconds};

/// Blend rate per adaptation step
const ADAPT_RATE: f32 = 0.15;

/// Formation parameters a leader prefers
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FormationPrefs {
    /// Base follow radius in meters
    pub base_radius: f32,
    /// Angle of the side positions in degrees
    pub side_angle: f32,
    /// Spacing between members in meters
    pub spacing: f32,
}

impl Default for FormationPrefs {
    fn default() -> Self {
        Self {
            base_radius: 8.0,
            side_angle: 35.0,
            spacing: 3.0,
        }
    }
}

impl FormationPrefs {
    /// Target preferences for observed local conditions
    ///
    /// Crowds shrink the formation; pressure widens it.
    pub fn target_for(local_density: usize, pressure: f32) -> Self {
        let crowd = (local_density as f32 / 8.0).min(1.0);
        let threat = (pressure / 3.0).min(1.0);

        Self {
            base_radius: 8.0 - crowd * 3.0 + threat * 4.0,
            side_angle: 35.0 + threat * 20.0,
            spacing: 3.0 - crowd * 1.0 + threat * 1.5,
        }
    }

    fn blend_toward(&mut self, target: &Self, rate: f32) {
        self.base_radius += (target.base_radius - self.base_radius) * rate;
        self.side_angle += (target.side_angle - self.side_angle) * rate;
        self.spacing += (target.spacing - self.spacing) * rate;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeaderEntry {
    leader: AgentId,
    prefs: FormationPrefs,
    last_update: Seconds,
}

/// Bounded per-leader preference store with an O(1) lookup cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderPrefs {
    entries: Vec<LeaderEntry>,
    capacity: usize,
    /// Lookup cache: leader -> index into `entries`. Rebuilt when a cached
    /// index turns out stale (eviction shifted the vector).
    #[serde(skip)]
    index: AHashMap<AgentId, usize>,
}

impl LeaderPrefs {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            index: AHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current preferences for a leader (defaults when unknown)
    pub fn get(&mut self, leader: AgentId) -> FormationPrefs {
        match self.find(leader) {
            Some(idx) => self.entries[idx].prefs,
            None => FormationPrefs::default(),
        }
    }

    /// Adapt a leader's preferences toward conditions observed this pass
    pub fn adapt(&mut self, leader: AgentId, local_density: usize, pressure: f32, now: Seconds) {
        let target = FormationPrefs::target_for(local_density, pressure);

        if let Some(idx) = self.find(leader) {
            let entry = &mut self.entries[idx];
            entry.prefs.blend_toward(&target, ADAPT_RATE);
            entry.last_update = now;
            return;
        }

        self.entries.push(LeaderEntry {
            leader,
            prefs: FormationPrefs::default(),
            last_update: now,
        });
        self.index.insert(leader, self.entries.len() - 1);

        if self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    fn find(&mut self, leader: AgentId) -> Option<usize> {
        if let Some(&idx) = self.index.get(&leader) {
            // Stale hit: cache survived an eviction or a snapshot reload
            if self.entries.get(idx).map(|e| e.leader) == Some(leader) {
                return Some(idx);
            }
            self.rebuild_index();
            return self.index.get(&leader).copied();
        }

        // Cache miss can also mean the cache was dropped by serde skip
        if self.index.len() != self.entries.len() {
            self.rebuild_index();
            return self.index.get(&leader).copied();
        }

        None
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, entry) in self.entries.iter().enumerate() {
            self.index.insert(entry.leader, idx);
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(idx) = self
            .entries
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.last_update.total_cmp(&b.last_update))
            .map(|(i, _)| i)
        {
            self.entries.remove(idx);
            self.rebuild_index();
        }
    }
}
