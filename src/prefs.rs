//! Preference Persistence Bridge
//!
//! Loads and saves the user's locomotion mode and category filter selection
//! through an external key-value store. Persistence failures are never fatal:
//! a missing or corrupt payload falls back to defaults with a logged warning,
//! matching the rest of the core's never-throw posture.
//!
//! Storage path for the file-backed store:
//! `<platform data dir>/trailside/preferences/{key}.json`

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::LocomotionMode;
use crate::error::StorageError;
use crate::store::{AppState, StateUpdate};

/// Well-known key the preference record is stored under.
pub const PREFERENCES_KEY: &str = "navViewPreferences";

/// The preference record that outlives a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Serialized as "WALKING" | "RUNNING" | "BIKING"
    #[serde(default)]
    pub locomotion: LocomotionMode,
    /// Selected category filter slugs
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            locomotion: LocomotionMode::Walking,
            categories: Vec::new(),
        }
    }
}

impl Preferences {
    /// Capture the persistable slice of the application state.
    pub fn from_state(state: &AppState) -> Self {
        Preferences {
            locomotion: state.locomotion_mode,
            categories: state.selected_categories.iter().cloned().collect(),
        }
    }

    /// A state update that applies these preferences to the store.
    pub fn to_update(&self) -> StateUpdate {
        StateUpdate::new()
            .locomotion_mode(self.locomotion)
            .selected_categories(self.categories.iter().cloned().collect::<BTreeSet<_>>())
    }
}

/// The external persistent key-value store the bridge talks to.
pub trait KeyValueStore {
    /// Raw payload stored under `key`, if any.
    fn get(&mut self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, used in tests and by hosts with their own persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&mut self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store keeping one JSON file per key under the platform
/// data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Store rooted at the platform data directory.
    pub fn new() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("", "", "trailside").ok_or(StorageError::NoDataDir)?;
        let mut base_dir = dirs.data_dir().to_owned();
        base_dir.push("preferences");
        Ok(FileStore { base_dir })
    }

    /// Store rooted at an explicit directory.
    pub fn with_dir(base_dir: PathBuf) -> Self {
        FileStore { base_dir }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        // Sanitize key for filesystem (replace / with __)
        let safe_key = key.replace('/', "__");
        self.base_dir.join(format!("{}.json", safe_key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&mut self, key: &str) -> Option<String> {
        let path = self.file_path(key);
        if !path.exists() {
            debug!("preference key not found: {}", key);
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Failed to read preferences {}: {}", path.display(), e);
                None
            }
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_dir)?;
        let path = self.file_path(key);
        let file = fs::File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
        debug!("Saved preferences: {}", path.display());
        Ok(())
    }
}

/// Bridges [`Preferences`] to an external key-value store.
pub struct PreferenceBridge<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceBridge<S> {
    pub fn new(store: S) -> Self {
        PreferenceBridge { store }
    }

    /// Load preferences, falling back to defaults on a missing or corrupt
    /// payload. Never fails.
    pub fn load(&mut self) -> Preferences {
        let payload = match self.store.get(PREFERENCES_KEY) {
            Some(p) => p,
            None => return Preferences::default(),
        };
        match serde_json::from_str(&payload) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Failed to parse saved preferences, using defaults: {}", e);
                Preferences::default()
            }
        }
    }

    /// Persist the preference record.
    pub fn save(&mut self, prefs: &Preferences) -> Result<(), StorageError> {
        let payload = serde_json::to_string(prefs)?;
        self.store.put(PREFERENCES_KEY, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_memory_store() {
        let mut bridge = PreferenceBridge::new(MemoryStore::new());
        let prefs = Preferences {
            locomotion: LocomotionMode::Biking,
            categories: vec!["drink".to_string(), "food".to_string()],
        };

        bridge.save(&prefs).unwrap();
        assert_eq!(bridge.load(), prefs);
    }

    #[test]
    fn test_load_defaults_when_missing() {
        let mut bridge = PreferenceBridge::new(MemoryStore::new());
        assert_eq!(bridge.load(), Preferences::default());
    }

    #[test]
    fn test_load_defaults_on_corrupt_payload() {
        let mut store = MemoryStore::new();
        store.put(PREFERENCES_KEY, "{not json").unwrap();

        let mut bridge = PreferenceBridge::new(store);
        let prefs = bridge.load();
        assert_eq!(prefs.locomotion, LocomotionMode::Walking);
        assert!(prefs.categories.is_empty());
    }

    #[test]
    fn test_record_wire_format() {
        let prefs = Preferences {
            locomotion: LocomotionMode::Running,
            categories: vec!["food".to_string()],
        };
        let json = serde_json::to_string(&prefs).unwrap();
        assert_eq!(json, r#"{"locomotion":"RUNNING","categories":["food"]}"#);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::with_dir(dir.path().to_owned());

        let mut bridge = PreferenceBridge::new(store);
        let prefs = Preferences {
            locomotion: LocomotionMode::Biking,
            categories: vec!["landmark".to_string()],
        };
        bridge.save(&prefs).unwrap();
        assert_eq!(bridge.load(), prefs);
    }

    #[test]
    fn test_state_bridging() {
        let prefs = Preferences {
            locomotion: LocomotionMode::Running,
            categories: vec!["drink".to_string()],
        };

        let store = crate::store::StateStore::new();
        store.update(prefs.to_update());

        let state = store.state();
        assert_eq!(state.locomotion_mode, LocomotionMode::Running);
        assert!(state.selected_categories.contains("drink"));
        assert_eq!(Preferences::from_state(&state), prefs);
    }
}
