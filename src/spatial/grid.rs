//! Sparse hash grid for efficient spatial queries
//!
//! Buckets agents by horizontal position. Rebuilt once per tick by the
//! simulation context; all per-agent queries during the decision phase are
//! read-only.

use ahash::AHashMap;

use crate::core::types::{AgentId, Vec3};

/// Sparse hash grid for O(1) neighbor queries
pub struct SpatialGrid {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<(AgentId, Vec3)>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    #[inline]
    fn cell_coord(&self, pos: Vec3) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, agent: AgentId, pos: Vec3) {
        let coord = self.cell_coord(pos);
        self.cells.entry(coord).or_default().push((agent, pos));
    }

    pub fn remove(&mut self, agent: AgentId, pos: Vec3) {
        let coord = self.cell_coord(pos);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&(e, _)| e != agent);
        }
    }

    /// All agents in the 3x3 cell neighborhood around a position
    pub fn query_neighbors(&self, pos: Vec3) -> impl Iterator<Item = (AgentId, Vec3)> + '_ {
        let (cx, cz) = self.cell_coord(pos);

        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dz| {
                self.cells
                    .get(&(cx + dx, cz + dz))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }

    /// Agents within radius of a center point
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<AgentId> {
        self.query_neighbors(center)
            .filter(|(_, pos)| center.distance(pos) <= radius)
            .map(|(agent, _)| agent)
            .collect()
    }

    /// Crowd density: neighbor count within radius, excluding the agent itself
    pub fn density_around(&self, agent: AgentId, center: Vec3, radius: f32) -> usize {
        self.query_neighbors(center)
            .filter(|&(other, pos)| other != agent && center.distance(&pos) <= radius)
            .count()
    }

    /// Rebuild grid from current positions
    pub fn rebuild(&mut self, agents: impl Iterator<Item = (AgentId, Vec3)>) {
        self.clear();
        for (agent, pos) in agents {
            self.insert(agent, pos);
        }
    }
}
