//! Persistent spatial memory: danger heat, spot clusters, approach
//! statistics, strategy weights, and leader formation preferences

pub mod approach;
pub mod heat;
pub mod leader;
pub mod persist;
pub mod spots;
pub mod store;
pub mod strategy;

pub use store::MemoryStore;
