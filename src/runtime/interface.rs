//! Collaborator interfaces to the surrounding game runtime
//!
//! The decision core drives movement, combat, and inventory through these
//! narrow traits and never blocks in them. Pathfinding may fail; callers
//! fall back to straight-line movement.

use crate::core::types::Vec3;

/// Weapon slot selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponSlot {
    Primary,
    Secondary,
    Melee,
}

/// Items an action may consume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Medkit,
    Grenade,
}

/// Result of a movement request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Moving,
    NoPath,
    Arrived,
}

/// World sensing queries
pub trait Sensing {
    fn has_line_of_sight(&self, from: Vec3, to: Vec3) -> bool;
}

/// Locomotion commands. `move_to` runs pathfinding and may return `NoPath`;
/// `move_direct` is the straight-line fallback and always succeeds.
pub trait Movement {
    fn move_to(&mut self, destination: Vec3) -> MoveResult;
    fn move_direct(&mut self, direction: Vec3);
    fn set_run(&mut self, running: bool);
    fn dash(&mut self);
    fn stop(&mut self);
}

/// Combat commands. All fail soft: a command with unmet preconditions is a
/// no-op reported by its return value.
pub trait Combat {
    fn fire_weapon(&mut self) -> bool;
    fn reload_weapon(&mut self) -> bool;
    fn switch_weapon(&mut self, slot: WeaponSlot) -> bool;
    fn melee_attack(&mut self) -> bool;
    fn use_item(&mut self, item: ItemKind) -> bool;
    fn throw_item(&mut self, item: ItemKind, at: Vec3) -> bool;
}

/// Inventory queries
pub trait Inventory {
    fn has_ranged_weapon(&self) -> bool;
    fn ammo_fraction(&self) -> f32;
    fn has_healing_item(&self) -> bool;
    fn has_throwable(&self) -> bool;
}

/// Everything an executing action needs from the runtime
pub trait Runtime: Sensing + Movement + Combat + Inventory {}

impl<T: Sensing + Movement + Combat + Inventory> Runtime for T {}
