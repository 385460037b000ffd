//! Agent state: personality, per-tick context, and the live-agent registry

pub mod context;
pub mod personality;
pub mod registry;

pub use context::AgentContext;
pub use personality::Personality;
pub use registry::{AgentRecord, AgentRegistry};
