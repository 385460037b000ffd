//! Brain warm-up state machine
//!
//! Loading the persisted brain is modeled as an explicit state machine
//! polled by the owner, with idempotent re-entry. Failure is a terminal
//! state the caller resolves by falling back to a fresh random brain.

use rand::Rng;
use tracing::warn;

use crate::brain::network::{GlobalBrain, NeuralNet};
use crate::memory::persist::{self, SnapshotStore, KEY_BRAIN};

/// Warm-up progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    Loading,
    Ready,
    Failed,
}

/// Drives brain loading to completion exactly once
pub struct BrainLoader {
    state: LoadState,
    layers: Vec<usize>,
    save_threshold: f32,
    brain: Option<GlobalBrain>,
}

impl BrainLoader {
    pub fn new(layers: Vec<usize>, save_threshold: f32) -> Self {
        Self {
            state: LoadState::NotStarted,
            layers,
            save_threshold,
            brain: None,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Advance the load. Safe to call repeatedly; once Ready or Failed the
    /// call is a no-op.
    pub fn poll(&mut self, store: &dyn SnapshotStore, rng: &mut impl Rng) {
        match self.state {
            LoadState::Ready | LoadState::Failed => {}
            LoadState::NotStarted | LoadState::Loading => {
                self.state = LoadState::Loading;

                let snapshot: Option<NeuralNet> = match store.load_blob(KEY_BRAIN) {
                    Ok(Some(blob)) => serde_json::from_str(&blob).ok(),
                    Ok(None) => None,
                    Err(error) => {
                        warn!(%error, "brain snapshot unreadable, starting fresh");
                        None
                    }
                };

                self.brain = Some(GlobalBrain::from_snapshot(
                    snapshot,
                    self.layers.clone(),
                    self.save_threshold,
                    rng,
                ));
                self.state = LoadState::Ready;
            }
        }
    }

    /// Take the loaded brain. Ready state only.
    pub fn take(&mut self) -> Option<GlobalBrain> {
        if self.state == LoadState::Ready {
            self.brain.take()
        } else {
            None
        }
    }
}

/// Persist the brain if the fitness ratchet allowed it
pub fn save_brain(store: &mut dyn SnapshotStore, brain: &GlobalBrain) {
    persist::save_snapshot(store, KEY_BRAIN, &brain.net);
}
