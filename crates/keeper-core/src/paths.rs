//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the keeper base directory (~/.keeper).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".keeper"))
}

/// Get the main config file path (~/.keeper/keeper.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("keeper.json5"))
}

/// Get the default server database path (~/.keeper/keeper.db).
pub fn database_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("keeper.db"))
}

/// Get the default object storage root (~/.keeper/objects).
pub fn objects_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("objects"))
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
