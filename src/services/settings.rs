//! Key/value settings persistence

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SettingsError;

pub const VALVE_NAME_KEY: &str = "valve_name";
pub const DEFAULT_LENGTH_KEY: &str = "default_length";

pub trait SettingsStore: Send + Sync {
    fn get_string(&self, key: &str, default: &str) -> String;
    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn put_int(&self, key: &str, value: i64) -> Result<(), SettingsError>;
}

type Entries = BTreeMap<String, Value>;

fn string_entry(entries: &Entries, key: &str, default: &str) -> String {
    entries
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn int_entry(entries: &Entries, key: &str, default: i64) -> i64 {
    entries.get(key).and_then(Value::as_i64).unwrap_or(default)
}

/// Settings kept only in memory
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: Mutex<Entries>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&self, key: &str, value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.entries.lock() {
            Ok(entries) => string_entry(&entries, key, default),
            Err(_) => default.to_string(),
        }
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.put(key, Value::from(value));
        Ok(())
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.entries.lock() {
            Ok(entries) => int_entry(&entries, key, default),
            Err(_) => default,
        }
    }

    fn put_int(&self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.put(key, Value::from(value));
        Ok(())
    }
}

/// Settings persisted as a flat JSON object, rewritten on every put
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileSettingsStore {
    /// Open the store, starting empty when the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, starting empty", path.display());
                Entries::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn put(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let content = {
            let mut entries = match self.entries.lock() {
                Ok(entries) => entries,
                Err(poisoned) => {
                    warn!("Settings lock was poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            entries.insert(key.to_string(), value);
            serde_json::to_string_pretty(&*entries)?
        };

        fs::write(&self.path, content)?;
        debug!("Saved setting {} to {}", key, self.path.display());
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.entries.lock() {
            Ok(entries) => string_entry(&entries, key, default),
            Err(_) => default.to_string(),
        }
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.put(key, Value::from(value))
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.entries.lock() {
            Ok(entries) => int_entry(&entries, key, default),
            Err(_) => default,
        }
    }

    fn put_int(&self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.put(key, Value::from(value))
    }
}
