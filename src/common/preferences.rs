//! User preferences and the store they persist in.
//!
//! The preferences are one blob with a fixed set of keys. Every entry carries
//! its `type`, which decides how it is edited from the context menu.

use std::cell::RefCell;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::common::collections::HashMap;
use crate::layout_engine::MainWindowSide;

pub const PREFERENCES_KEY: &str = "preferences";

pub const ENABLED: &str = "enabled";
pub const MAIN_WINDOW: &str = "main_window";
pub const SOUNDS: &str = "sounds";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse stored preferences: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("preference blob is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Preference {
    /// Toggled by the action itself; never shown in the menu.
    Action { status: bool },
    Checkbox { title: String, status: bool },
    Select {
        title: String,
        status: String,
        options: Vec<String>,
    },
}

impl Preference {
    pub fn flag(&self) -> Option<bool> {
        match self {
            Preference::Action { status } | Preference::Checkbox { status, .. } => Some(*status),
            Preference::Select { .. } => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Preferences {
    #[serde(default = "default_enabled")]
    pub enabled: Preference,
    #[serde(default = "default_main_window")]
    pub main_window: Preference,
    #[serde(default = "default_sounds")]
    pub sounds: Preference,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            main_window: default_main_window(),
            sounds: default_sounds(),
        }
    }
}

fn default_enabled() -> Preference { Preference::Action { status: true } }

fn default_main_window() -> Preference {
    Preference::Select {
        title: "Main window".to_string(),
        status: "left".to_string(),
        options: vec!["left".to_string(), "right".to_string(), "none".to_string()],
    }
}

fn default_sounds() -> Preference {
    Preference::Checkbox {
        title: "Sounds".to_string(),
        status: true,
    }
}

impl Preferences {
    /// Entries in menu order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Preference)> {
        [
            (ENABLED, &self.enabled),
            (MAIN_WINDOW, &self.main_window),
            (SOUNDS, &self.sounds),
        ]
        .into_iter()
    }

    pub fn get(&self, key: &str) -> Option<&Preference> {
        match key {
            ENABLED => Some(&self.enabled),
            MAIN_WINDOW => Some(&self.main_window),
            SOUNDS => Some(&self.sounds),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Preference> {
        match key {
            ENABLED => Some(&mut self.enabled),
            MAIN_WINDOW => Some(&mut self.main_window),
            SOUNDS => Some(&mut self.sounds),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool { self.enabled.flag().unwrap_or(false) }

    pub fn set_enabled(&mut self, enabled: bool) {
        match &mut self.enabled {
            Preference::Action { status } | Preference::Checkbox { status, .. } => {
                *status = enabled
            }
            other @ Preference::Select { .. } => *other = Preference::Action { status: enabled },
        }
    }

    pub fn sounds(&self) -> bool { self.sounds.flag().unwrap_or(false) }

    /// Unrecognised values fall back to the plain grid.
    pub fn main_window_side(&self) -> MainWindowSide {
        match &self.main_window {
            Preference::Select { status, .. } => status.parse().unwrap_or(MainWindowSide::None),
            _ => MainWindowSide::None,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait PreferenceStore {
    /// Returns the blob stored under `key`, or `defaults` when there is none.
    async fn load(&self, key: &str, defaults: &Preferences)
    -> Result<Preferences, PreferenceError>;

    async fn save(&self, key: &str, preferences: &Preferences) -> Result<(), PreferenceError>;
}

/// Keeps blobs as JSON values in memory.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    blobs: RefCell<HashMap<String, serde_json::Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self { Self::default() }

    pub fn with(key: &str, preferences: &Preferences) -> Result<Self, PreferenceError> {
        let store = Self::new();
        store.blobs.borrow_mut().insert(key.to_string(), serde_json::to_value(preferences)?);
        Ok(store)
    }

    pub fn raw(&self, key: &str) -> Option<serde_json::Value> {
        self.blobs.borrow().get(key).cloned()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    async fn load(
        &self,
        key: &str,
        defaults: &Preferences,
    ) -> Result<Preferences, PreferenceError> {
        match self.blobs.borrow().get(key) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(defaults.clone()),
        }
    }

    async fn save(&self, key: &str, preferences: &Preferences) -> Result<(), PreferenceError> {
        let value = serde_json::to_value(preferences)?;
        self.blobs.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Keeps each blob in its own TOML file under a directory.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    dir: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn path_for(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.toml")) }
}

impl PreferenceStore for FilePreferenceStore {
    async fn load(
        &self,
        key: &str,
        defaults: &Preferences,
    ) -> Result<Preferences, PreferenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(?path, "no stored preferences, using defaults");
            return Ok(defaults.clone());
        }
        let buf = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&buf)?)
    }

    async fn save(&self, key: &str, preferences: &Preferences) -> Result<(), PreferenceError> {
        std::fs::create_dir_all(&self.dir)?;
        let buf = toml::to_string_pretty(preferences)?;
        std::fs::write(self.path_for(key), buf.as_bytes())?;
        Ok(())
    }
}
