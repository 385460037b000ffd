//! Snapshot persistence for memory and the shared brain
//!
//! Everything is a plain key -> JSON blob. Failures are logged and replaced
//! by defaults; persistence never takes down the simulation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::error::Result;

/// Key under which the session-global memory half is stored
pub const KEY_GLOBAL: &str = "memory_global";

/// Key under which the shared brain is stored
pub const KEY_BRAIN: &str = "brain";

/// Key for a specific map's memory half
pub fn map_key(map_name: &str) -> String {
    format!("memory_map_{map_name}")
}

/// Plain key -> JSON blob store
pub trait SnapshotStore {
    fn load_blob(&self, key: &str) -> Result<Option<String>>;
    fn save_blob(&mut self, key: &str, blob: &str) -> Result<()>;
}

/// File-backed snapshot store: one JSON file per key
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileStore {
    fn load_blob(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn save_blob(&mut self, key: &str, blob: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), blob)?;
        Ok(())
    }
}

/// In-memory store for tests and headless runs
#[derive(Default)]
pub struct MemoryBackedStore {
    blobs: ahash::AHashMap<String, String>,
}

impl SnapshotStore for MemoryBackedStore {
    fn load_blob(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn save_blob(&mut self, key: &str, blob: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// Load a snapshot, falling back to `default` on any failure
pub fn load_or_default<T: DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
    default: impl FnOnce() -> T,
) -> T {
    match store.load_blob(key) {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(value) => {
                debug!(key, "loaded snapshot");
                value
            }
            Err(error) => {
                warn!(key, %error, "snapshot corrupt, using defaults");
                default()
            }
        },
        Ok(None) => {
            debug!(key, "no snapshot, using defaults");
            default()
        }
        Err(error) => {
            warn!(key, %error, "snapshot load failed, using defaults");
            default()
        }
    }
}

/// Save a snapshot; failures are logged and swallowed
pub fn save_snapshot<T: Serialize>(store: &mut dyn SnapshotStore, key: &str, value: &T) {
    let blob = match serde_json::to_string(value) {
        Ok(blob) => blob,
        Err(error) => {
            warn!(key, %error, "snapshot serialize failed");
            return;
        }
    };

    if let Err(error) = store.save_blob(key, &blob) {
        warn!(key, %error, "snapshot save failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::strategy::StrategyWeights;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryBackedStore::default();
        let mut weights = StrategyWeights::new();
        weights.apply_reward("rush", 0.5);

        save_snapshot(&mut store, KEY_GLOBAL, &weights);
        let restored: StrategyWeights =
            load_or_default(&store, KEY_GLOBAL, StrategyWeights::new);

        assert!((restored.get("rush") - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_missing_key_uses_default() {
        let store = MemoryBackedStore::default();
        let restored: StrategyWeights =
            load_or_default(&store, "nothing_here", StrategyWeights::new);
        assert!(restored.is_empty());
    }

    #[test]
    fn test_corrupt_blob_uses_default() {
        let mut store = MemoryBackedStore::default();
        store
            .save_blob(KEY_GLOBAL, "{ not json")
            .expect("Should save");

        let restored: StrategyWeights =
            load_or_default(&store, KEY_GLOBAL, StrategyWeights::new);
        assert!(restored.is_empty());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let mut store = FileStore::new(dir.path());

        let mut weights = StrategyWeights::new();
        weights.apply_reward("camp", -0.3);
        save_snapshot(&mut store, &map_key("factory"), &weights);

        let restored: StrategyWeights =
            load_or_default(&store, &map_key("factory"), StrategyWeights::new);
        assert!((restored.get("camp") - 0.7).abs() < 0.001);
    }
}
