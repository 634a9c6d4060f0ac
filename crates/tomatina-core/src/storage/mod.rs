mod settings;

pub use settings::{Settings, SettingsStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/tomatina[-dev]/` based on TOMATINA_ENV.
///
/// Set TOMATINA_ENV=dev to use the development config directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TOMATINA_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("tomatina-dev")
    } else {
        base_dir.join("tomatina")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
