/// Persisted user preferences.
///
/// Stored as pretty JSON at `<config dir>/disksweep/settings.json`. A missing
/// or unreadable file never stops the program: loading falls back to the
/// defaults and logs why.
use crate::error::{CleanError, Result};
use crate::model::CleaningOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "disksweep";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub options: CleaningOptions,
    /// Interval for the scheduler, if the user configured one.
    pub schedule_hours: Option<u32>,
}

impl Settings {
    /// `<config dir>/disksweep/settings.json`, if the OS has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load from the default location.
    pub fn load() -> Self {
        Self::default_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load from `path`. Missing, unreadable or invalid files give defaults.
    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                warn!("Cannot read settings {}: {err}", path.display());
                return Self::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            warn!("Invalid settings {}: {err}", path.display());
            Self::default()
        })
    }

    /// Save to the default location, returning the path written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| CleanError::Settings("no configuration directory".to_string()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CleanError::Settings(e.to_string()))
    }

    /// Write pretty JSON to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CleanError::Settings(format!("{}: {e}", parent.display())))?;
        }
        fs::write(path, self.to_json()?)
            .map_err(|e| CleanError::Settings(format!("{}: {e}", path.display())))
    }
}
