//! Process-wide settings.
//!
//! Settings are loaded once at startup from a single JSON blob, merged over the
//! compiled-in defaults, and shared through a [`SettingsHandle`]. The handle's
//! [`SettingsHandle::apply`] is the only write path and persists immediately.

use crate::error::{Result, SaveError, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Fixed key (file name) the settings blob is stored under.
pub const SETTINGS_KEY: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
        };
        f.write_str(s)
    }
}

impl FromStr for Position {
    type Err = SaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top-left" => Ok(Position::TopLeft),
            "top-right" => Ok(Position::TopRight),
            "bottom-left" => Ok(Position::BottomLeft),
            "bottom-right" => Ok(Position::BottomRight),
            other => Err(SaveError::Api(format!("Unknown position: {}", other))),
        }
    }
}

/// Which actions a front-end should offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonSettings {
    pub save: bool,
    pub load: bool,
    pub quick_save: bool,
    pub quick_load: bool,
    pub export: bool,
    pub import: bool,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            save: true,
            load: true,
            quick_save: true,
            quick_load: true,
            export: true,
            import: true,
        }
    }
}

impl ButtonSettings {
    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "save" => Some(&mut self.save),
            "load" => Some(&mut self.load),
            "quick-save" => Some(&mut self.quick_save),
            "quick-load" => Some(&mut self.quick_load),
            "export" => Some(&mut self.export),
            "import" => Some(&mut self.import),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Compress payloads of new saves.
    pub compression: bool,
    pub buttons: ButtonSettings,
    pub position: Position,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compression: true,
            buttons: ButtonSettings::default(),
            position: Position::default(),
        }
    }
}

impl Settings {
    /// Parse a stored blob. Missing fields take their defaults; anything
    /// unparseable yields the defaults.
    pub fn from_blob(blob: &str) -> Self {
        match serde_json::from_str(blob) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "stored settings are malformed, using defaults");
                Self::default()
            }
        }
    }

    /// Read a single key (`compression`, `position`, `buttons.<name>`).
    pub fn get_key(&self, key: &str) -> Result<String> {
        match key {
            "compression" => Ok(self.compression.to_string()),
            "position" => Ok(self.position.to_string()),
            _ => {
                let mut buttons = self.buttons.clone();
                button_flag(&mut buttons, key).map(|flag| flag.to_string())
            }
        }
    }

    /// Return a copy with one key changed.
    pub fn with_key(&self, key: &str, value: &str) -> Result<Self> {
        let mut next = self.clone();
        match key {
            "compression" => next.compression = parse_bool(value)?,
            "position" => next.position = value.parse()?,
            _ => *button_flag(&mut next.buttons, key)? = parse_bool(value)?,
        }
        Ok(next)
    }
}

fn button_flag<'a>(buttons: &'a mut ButtonSettings, key: &str) -> Result<&'a mut bool> {
    key.strip_prefix("buttons.")
        .and_then(|name| buttons.flag_mut(name))
        .ok_or_else(|| SaveError::Api(format!("Unknown config key: {}", key)))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(SaveError::Api(format!("Expected true/false, got: {}", other))),
    }
}

/// Shared, single-writer access to the process settings.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    current: Arc<RwLock<Settings>>,
    dir: Option<PathBuf>,
}

impl SettingsHandle {
    /// Load settings stored in `dir`, falling back to defaults when absent or
    /// malformed.
    pub fn load<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(SETTINGS_KEY);
        let settings = match fs::read_to_string(&path) {
            Ok(blob) => Settings::from_blob(&blob),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
                Settings::default()
            }
        };
        debug!(?settings, "settings loaded");
        Self {
            current: Arc::new(RwLock::new(settings)),
            dir: Some(dir),
        }
    }

    /// Settings that live only in memory.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            current: Arc::new(RwLock::new(settings)),
            dir: None,
        }
    }

    pub fn get(&self) -> Settings {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn compression_enabled(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .compression
    }

    /// Replace the settings and persist them.
    pub fn apply(&self, settings: Settings) -> Result<()> {
        if let Some(dir) = &self.dir {
            persist(dir, &settings).map_err(SaveError::StoreUnavailable)?;
        }
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
        Ok(())
    }
}

fn persist(dir: &Path, settings: &Settings) -> std::result::Result<(), StoreError> {
    fs::create_dir_all(dir)?;
    let blob = serde_json::to_string_pretty(settings)?;
    let tmp = dir.join(format!(".settings-{}.tmp", Uuid::new_v4()));
    fs::write(&tmp, blob)?;
    if let Err(e) = fs::rename(&tmp, dir.join(SETTINGS_KEY)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
