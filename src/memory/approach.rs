//! Approach-outcome statistics on a quantized grid
//!
//! Positions are snapped to a coarse cell (2 m horizontal, 1 m vertical)
//! before lookup so nearby attempts generalize. Weights feed route and
//! engagement-point selection: above 1.0 means the cell has worked before,
//! below 1.0 means it keeps getting agents killed.

use serde::{Deserialize, Serialize};

use crate::core::types::{Seconds, Vec3};

/// Horizontal quantization step in meters
const CELL_XZ: f32 = 2.0;

/// Vertical quantization step in meters
const CELL_Y: f32 = 1.0;

/// Recency decay constant: confidence in old outcomes fades over ~2 minutes
const RECENCY_DECAY: f32 = 120.0;

/// Sample count at which confidence saturates
const CONFIDENCE_SAMPLES: f32 = 5.0;

/// Quantized grid cell key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApproachCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ApproachCell {
    pub fn from_position(pos: Vec3) -> Self {
        Self {
            x: (pos.x / CELL_XZ).floor() as i32,
            y: (pos.y / CELL_Y).floor() as i32,
            z: (pos.z / CELL_XZ).floor() as i32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApproachRecord {
    cell: ApproachCell,
    successes: u32,
    failures: u32,
    last_used: Seconds,
}

/// Bounded per-cell success/failure history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproachStats {
    records: Vec<ApproachRecord>,
    capacity: usize,
}

impl ApproachStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record the outcome of an approach through a point
    pub fn record_outcome(&mut self, point: Vec3, success: bool, now: Seconds) {
        let cell = ApproachCell::from_position(point);

        if let Some(record) = self.records.iter_mut().find(|r| r.cell == cell) {
            if success {
                record.successes += 1;
            } else {
                record.failures += 1;
            }
            record.last_used = now;
            return;
        }

        self.records.push(ApproachRecord {
            cell,
            successes: success as u32,
            failures: !success as u32,
            last_used: now,
        });

        if self.records.len() > self.capacity {
            self.evict_least_recent();
        }
    }

    /// Weight for approaching through a point.
    ///
    /// Interpolates between 1.0 (no data) and 2x the empirical success
    /// rate, scaled by recency and by sample-count confidence. Converges to
    /// 2.0 for a cell that always works and to 0.0 for one that never does.
    pub fn approach_weight(&self, point: Vec3, now: Seconds) -> f32 {
        let cell = ApproachCell::from_position(point);

        let Some(record) = self.records.iter().find(|r| r.cell == cell) else {
            return 1.0;
        };

        let samples = (record.successes + record.failures) as f32;
        if samples == 0.0 {
            return 1.0;
        }

        let success_rate = record.successes as f32 / samples;
        let confidence = (samples / CONFIDENCE_SAMPLES).min(1.0);
        let recency = (-(now - record.last_used).max(0.0) / RECENCY_DECAY).exp();

        let influence = confidence * recency;
        1.0 * (1.0 - influence) + (success_rate * 2.0) * influence
    }

    fn evict_least_recent(&mut self) {
        if let Some(idx) = self
            .records
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.last_used.total_cmp(&b.last_used))
            .map(|(i, _)| i)
        {
            self.records.remove(idx);
        }
    }
}
