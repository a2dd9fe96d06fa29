// Tab Wrangler Settings Engine
// Owns the named options and counters: loading, saving, reading and updating
// individual values by key, and resetting a key to its default.
// Settings are stored as a JSON file, or kept in memory when no path is given.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::types::errors::SettingsError;
use crate::types::settings::WranglerSettings;
use crate::types::tab::TabId;

/// Get/set contract every component reads its options through.
///
/// Keys are the camelCase option names (`maxTabs`, `lockedIds`, ...).
pub trait SettingsStore {
    /// Returns the current value for `key`, or `None` for an unknown key.
    fn get(&self, key: &str) -> Option<Value>;
    /// Validates and stores `value` under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    /// Stores every entry, or none of them if any entry or the write fails.
    fn set_all(&mut self, entries: &[(&str, Value)]) -> Result<(), SettingsError>;
    /// Restores the default value for `key`.
    fn reset_key(&mut self, key: &str) -> Result<(), SettingsError>;

    fn get_u64(&self, key: &str) -> u64 {
        self.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
    }

    fn get_i64(&self, key: &str) -> i64 {
        self.get(key).and_then(|v| v.as_i64()).unwrap_or(0)
    }

    fn get_usize(&self, key: &str) -> usize {
        self.get_u64(key) as usize
    }

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    fn get_strings(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    fn get_ids(&self, key: &str) -> Vec<TabId> {
        self.get(key)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

/// Settings engine that persists [`WranglerSettings`] as JSON on disk.
pub struct SettingsEngine {
    config_path: Option<PathBuf>,
    settings: WranglerSettings,
}

impl SettingsEngine {
    /// Creates an engine with default settings.
    ///
    /// With `Some(path)` the settings are read from and written to that file;
    /// with `None` they live only in memory.
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            settings: WranglerSettings::default(),
        }
    }

    /// Memory-only engine seeded with `settings`.
    pub fn in_memory(settings: WranglerSettings) -> Self {
        Self {
            config_path: None,
            settings,
        }
    }

    /// Loads settings from the config file.
    ///
    /// A missing file yields defaults with `installDate` stamped to now, and
    /// is written out so the stamp survives restarts. A malformed file is a
    /// serialization error.
    pub fn load(&mut self) -> Result<WranglerSettings, SettingsError> {
        let Some(path) = self.config_path.as_deref() else {
            return Ok(self.settings.clone());
        };

        if !path.exists() {
            self.settings = WranglerSettings {
                install_date: now_millis(),
                ..WranglerSettings::default()
            };
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Ok(self.settings.clone())
    }

    /// Writes the current settings, creating parent directories as needed.
    /// No-op for a memory-only engine.
    pub fn save(&self) -> Result<(), SettingsError> {
        write_settings(self.config_path.as_deref(), &self.settings)
    }

    pub fn get_settings(&self) -> &WranglerSettings {
        &self.settings
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

impl SettingsStore for SettingsEngine {
    fn get(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(&self.settings) {
            Ok(Value::Object(mut map)) => map.remove(key),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.set_all(&[(key, value)])
    }

    /// Applies the entries to a copy, writes the copy, and only then swaps
    /// it in. A rejected value or a failed write leaves the live settings
    /// untouched.
    fn set_all(&mut self, entries: &[(&str, Value)]) -> Result<(), SettingsError> {
        let mut updated = self.settings.clone();
        for (key, value) in entries {
            updated = with_value(&updated, key, value.clone())?;
        }
        write_settings(self.config_path.as_deref(), &updated)?;
        self.settings = updated;
        Ok(())
    }

    fn reset_key(&mut self, key: &str) -> Result<(), SettingsError> {
        let defaults = SettingsEngine::in_memory(WranglerSettings::default());
        let value = defaults
            .get(key)
            .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
        self.set(key, value)
    }
}

/// Converts the settings to a JSON object, replaces `key`, and deserializes
/// back so a value of the wrong shape is rejected.
fn with_value(settings: &WranglerSettings, key: &str, value: Value) -> Result<WranglerSettings, SettingsError> {
    if key.is_empty() {
        return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
    }

    let mut json_value = serde_json::to_value(settings).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })?;

    match &mut json_value {
        Value::Object(map) if map.contains_key(key) => {
            map.insert(key.to_string(), value);
        }
        _ => {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' not found in settings",
                key
            )));
        }
    }

    serde_json::from_value(json_value).map_err(|e| {
        SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
    })
}

fn write_settings(path: Option<&Path>, settings: &WranglerSettings) -> Result<(), SettingsError> {
    let Some(path) = path else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SettingsError::IoError(format!("Failed to create config directory: {}", e))
        })?;
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| {
        SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
    })?;

    fs::write(path, json)
        .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
