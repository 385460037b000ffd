//! Tick-based combat decision core
//!
//! Every agent, every decision tick, picks one action from a fixed
//! repertoire and commits to it long enough to matter. The pipeline:
//! spatial memory + agent state feed a rule-based utility scorer and a
//! small shared neural net, a blender mixes the two, a hysteresis layer
//! suppresses thrash, and the surviving action drives external movement
//! and combat collaborators. A squad coordinator and a difficulty
//! controller steer the whole population on slower cadences.
//!
//! The crate is a library embedded in a larger game runtime; everything
//! the world must provide is behind the traits in [`runtime::interface`].

pub mod actions;
pub mod agent;
pub mod brain;
pub mod core;
pub mod decision;
pub mod difficulty;
pub mod memory;
pub mod runtime;
pub mod spatial;
pub mod squad;

pub use crate::actions::ActionKind;
pub use crate::agent::{AgentContext, AgentRegistry, Personality};
pub use crate::core::config::DecisionConfig;
pub use crate::core::error::{AiError, Result};
pub use crate::core::types::{AgentId, Seconds, SquadId, Vec3};
pub use crate::decision::DecisionEngine;
pub use crate::difficulty::DifficultyController;
pub use crate::memory::MemoryStore;
pub use crate::runtime::SimulationContext;
pub use crate::squad::SquadCoordinator;
