//! The fixed action repertoire
//!
//! Actions are a closed enum rather than trait objects so scoring can be an
//! exhaustive match and tests can enumerate every kind. Declaration order
//! is the tie-break priority: when two actions blend to exactly equal
//! scores, the earlier variant wins.

pub mod evaluate;
pub mod execute;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Seconds;

/// Every action an agent can take, in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Unstuck,
    Heal,
    Retreat,
    Panic,
    Reload,
    TakeCover,
    Engage,
    Flank,
    Suppress,
    Chase,
    Search,
    ThrowGrenade,
    BossCommand,
    Patrol,
}

impl ActionKind {
    /// All actions in priority order. Index here is also the index into the
    /// neural net's output vector.
    pub const ALL: [ActionKind; 14] = [
        ActionKind::Unstuck,
        ActionKind::Heal,
        ActionKind::Retreat,
        ActionKind::Panic,
        ActionKind::Reload,
        ActionKind::TakeCover,
        ActionKind::Engage,
        ActionKind::Flank,
        ActionKind::Suppress,
        ActionKind::Chase,
        ActionKind::Search,
        ActionKind::ThrowGrenade,
        ActionKind::BossCommand,
        ActionKind::Patrol,
    ];

    /// Position in `ALL`
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|&k| k == self)
            .expect("every kind appears in ALL")
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Unstuck => "unstuck",
            ActionKind::Heal => "heal",
            ActionKind::Retreat => "retreat",
            ActionKind::Panic => "panic",
            ActionKind::Reload => "reload",
            ActionKind::TakeCover => "take_cover",
            ActionKind::Engage => "engage",
            ActionKind::Flank => "flank",
            ActionKind::Suppress => "suppress",
            ActionKind::Chase => "chase",
            ActionKind::Search => "search",
            ActionKind::ThrowGrenade => "throw_grenade",
            ActionKind::BossCommand => "boss_command",
            ActionKind::Patrol => "patrol",
        }
    }

    /// Actions that need a ranged weapon in hand
    pub fn needs_ranged_weapon(self) -> bool {
        matches!(
            self,
            ActionKind::Engage | ActionKind::Suppress | ActionKind::Reload
        )
    }

    /// Whether execution may refuse interruption (mid-animation commitment)
    pub fn can_be_interrupted(self) -> bool {
        !matches!(self, ActionKind::ThrowGrenade)
    }
}

/// Per-action mutable bookkeeping owned by one agent
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    /// Seconds until this action may score again; 0 means ready
    pub cooldown: Seconds,
    /// Accumulated seconds this action has been the active one
    pub time_active: Seconds,
}

/// One agent's full set of action states
#[derive(Debug, Clone)]
pub struct ActionSet {
    states: AHashMap<ActionKind, ActionState>,
}

impl ActionSet {
    pub fn new() -> Self {
        let mut states = AHashMap::new();
        for kind in ActionKind::ALL {
            states.insert(kind, ActionState::default());
        }
        Self { states }
    }

    pub fn state(&self, kind: ActionKind) -> &ActionState {
        &self.states[&kind]
    }

    pub fn state_mut(&mut self, kind: ActionKind) -> &mut ActionState {
        self.states.get_mut(&kind).expect("all kinds present")
    }

    pub fn on_cooldown(&self, kind: ActionKind) -> bool {
        self.states[&kind].cooldown > 0.0
    }

    pub fn set_cooldown(&mut self, kind: ActionKind, seconds: Seconds) {
        self.state_mut(kind).cooldown = seconds;
    }

    /// Advance timers by one frame
    pub fn tick(&mut self, dt: Seconds, active: Option<ActionKind>) {
        for (kind, state) in self.states.iter_mut() {
            state.cooldown = (state.cooldown - dt).max(0.0);
            if Some(*kind) == active {
                state.time_active += dt;
            }
        }
    }

    /// Reset the active-time counter when an action is freshly entered
    pub fn reset_time_active(&mut self, kind: ActionKind) {
        self.state_mut(kind).time_active = 0.0;
    }
}

impl Default for ActionSet {
    fn default() -> Self {
        Self::new()
    }
}
