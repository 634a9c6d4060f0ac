//! TOML-based user settings.
//!
//! One value matters to the timer: the configured pomodoro length in whole
//! minutes. Absence is meaningful (no duration configured, starting is a
//! no-op), so the field is optional rather than defaulted.
//!
//! Settings are stored at `~/.config/tomatina/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config_dir;
use crate::error::ConfigError;
use crate::timer::DurationSource;

/// User settings, serialized to/from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Pomodoro length in whole minutes; `None` means not configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_duration: Option<i64>,
}

impl Settings {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// String accessor for the CLI. `None` for unknown keys or unset values.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "timer_duration" => self.timer_duration.map(|m| m.to_string()),
            _ => None,
        }
    }

    /// String mutator for the CLI.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "timer_duration" => {
                let minutes: i64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("expected whole minutes, got '{value}'"),
                })?;
                if minutes <= 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "duration must be positive".to_string(),
                    });
                }
                self.timer_duration = Some(minutes);
                Ok(())
            }
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }
}

/// File-backed settings accessor.
///
/// Reads go back to the file every time, so an edited duration takes effect
/// the next time a timer is started from idle -- a running countdown keeps
/// the total it was started with.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the default config location, creating the directory.
    pub fn open() -> Result<Self, ConfigError> {
        Ok(Self {
            path: config_dir()?.join("config.toml"),
        })
    }

    /// Store at an explicit path (tests, alternate profiles).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings; a missing or corrupt file reads as defaults.
    pub fn read(&self) -> Settings {
        match Settings::load_from(&self.path) {
            Ok(settings) => settings,
            Err(ConfigError::LoadFailed { .. }) => Settings::default(),
            Err(e) => {
                tracing::warn!("settings unreadable, using defaults: {e}");
                Settings::default()
            }
        }
    }

    pub fn write(&self, settings: &Settings) -> Result<(), ConfigError> {
        settings.save_to(&self.path)
    }
}

impl DurationSource for SettingsStore {
    fn timer_duration_min(&self) -> Option<i64> {
        self.read().timer_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));
        assert_eq!(store.read(), Settings::default());
        assert_eq!(store.timer_duration_min(), None);
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));

        let mut settings = Settings::default();
        settings.set("timer_duration", "25").unwrap();
        store.write(&settings).unwrap();

        assert_eq!(store.read().timer_duration, Some(25));
        assert_eq!(store.timer_duration_min(), Some(25));
    }

    #[test]
    fn corrupt_file_reads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer_duration = \"not a number\"").unwrap();

        let store = SettingsStore::at(path);
        assert_eq!(store.read(), Settings::default());
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(settings.set("timer_duration", "soon").is_err());
        assert!(settings.set("timer_duration", "0").is_err());
        assert!(settings.set("timer_duration", "-5").is_err());
        assert!(settings.set("nope", "1").is_err());
    }

    #[test]
    fn get_reports_unset_and_unknown_as_none() {
        let settings = Settings::default();
        assert_eq!(settings.get("timer_duration"), None);
        assert_eq!(settings.get("nope"), None);

        let mut settings = Settings::default();
        settings.set("timer_duration", "15").unwrap();
        assert_eq!(settings.get("timer_duration").as_deref(), Some("15"));
    }
}
