//! The decision pipeline: blending, hysteresis, and the per-agent engine

pub mod blend;
pub mod engine;
pub mod stability;

pub use engine::DecisionEngine;
pub use stability::{StabilityLayer, Transition};
