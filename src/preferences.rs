//! Persisted user preferences: dark mode and saved articles.
//!
//! Storage is a flat string-to-string map, the same shape as browser local storage, so each
//! value is serialised JSON under a fixed key. Reading never fails: anything missing or
//! unparseable falls back to the default and is only logged.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key holding the dark mode flag.
pub const DARK_MODE_KEY: &str = "darkMode";
/// Key holding the saved article ids.
pub const SAVED_IDS_KEY: &str = "savedConstitucion";

/// String key-value storage.
pub trait PreferenceStore {
    /// Stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[derive(Default)]
/// In-process store; nothing survives the process.
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object file, rewritten on every change.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    #[must_use]
    /// Open the store at `path`. A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preferences file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    #[must_use]
    /// Default location in the platform data directory, if one exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("carta").join("preferences.json"))
    }

    #[must_use]
    /// File this store writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values).map_err(std::io::Error::other)?;
        fs::write(&self.path, json)
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.write().map_err(|e| Error::Preferences {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The persisted slice of application state.
pub struct Preferences {
    /// Dark colour scheme.
    pub dark_mode: bool,
    /// Ids of saved articles, in the order they were saved.
    pub saved_ids: Vec<String>,
}

fn read_or_default<T: DeserializeOwned + Default>(store: &impl PreferenceStore, key: &str) -> T {
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "ignoring malformed preference");
        T::default()
    })
}

impl Preferences {
    #[must_use]
    /// Read preferences, substituting defaults for anything missing or malformed.
    pub fn load(store: &impl PreferenceStore) -> Self {
        Self {
            dark_mode: read_or_default(store, DARK_MODE_KEY),
            saved_ids: read_or_default(store, SAVED_IDS_KEY),
        }
    }

    /// Write both keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist a value.
    pub fn save(&self, store: &mut impl PreferenceStore) -> Result<()> {
        store.set(DARK_MODE_KEY, serde_json::to_string(&self.dark_mode)?)?;
        store.set(SAVED_IDS_KEY, serde_json::to_string(&self.saved_ids)?)?;
        Ok(())
    }

    #[must_use]
    /// Whether `id` is saved.
    pub fn is_saved(&self, id: &str) -> bool {
        self.saved_ids.iter().any(|s| s == id)
    }

    /// Save `id` if it is not saved, otherwise remove it.
    pub fn toggle_saved(&mut self, id: &str) {
        if self.is_saved(id) {
            self.saved_ids.retain(|s| s != id);
        } else {
            self.saved_ids.push(id.to_string());
        }
    }
}

#[cfg(test)]
#[path = "tests/preferences.rs"]
mod tests;
