//! Shared neural scorer: fixed-topology network, feature extraction, and
//! the persisted-brain warm-up state machine

pub mod features;
pub mod loader;
pub mod network;

pub use features::INPUT_SIZE;
pub use loader::{BrainLoader, LoadState};
pub use network::{EpisodeReport, GlobalBrain, NeuralNet};
