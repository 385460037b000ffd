//! Spatial indexing for neighbor and density queries

pub mod grid;

pub use grid::SpatialGrid;
