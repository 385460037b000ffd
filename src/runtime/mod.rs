//! Collaborator interfaces and shared service ownership

pub mod context;
pub mod interface;

pub use context::{EngagementRegistry, SimulationContext};
pub use interface::{Combat, Inventory, ItemKind, MoveResult, Movement, Runtime, Sensing, WeaponSlot};
