//! Configuration loading and persistence.

use super::{Config, StorageBackend};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::debug;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path` when given, else from the default path, falling back
    /// to defaults when no file exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let result = match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        };
        match result {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(missing)) if path.is_none() => {
                debug!(path = %missing.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.address.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "Server address '{}' is not a valid host:port",
                self.server.address
            ));
        }

        if let Some(url) = &self.server.database_url {
            if !url.starts_with("sqlite:") {
                errors.push(format!("Database URL '{}' must start with 'sqlite:'", url));
            }
        }

        if self.server.body_limit_bytes == 0 {
            errors.push("Server body limit must be greater than 0".to_string());
        }

        if self.server.token_ttl_secs == 0 {
            errors.push("Session token TTL must be greater than 0".to_string());
        }

        if self.storage.list_timeout_secs == 0 {
            errors.push("Storage list timeout must be greater than 0".to_string());
        }

        if self.storage.upload_timeout_secs == 0 {
            errors.push("Storage upload timeout must be greater than 0".to_string());
        }

        if self.storage.backend == StorageBackend::Fs {
            if let Some(root) = &self.storage.root {
                if root.as_os_str().is_empty() {
                    errors.push("Storage root must not be empty".to_string());
                }
            }
        }

        if let Some(url) = &self.client.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!(
                    "Client server URL '{}' must start with http:// or https://",
                    url
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// The SQLite URL to open, defaulting to `~/.keeper/keeper.db`.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        match &self.server.database_url {
            Some(url) => Ok(url.clone()),
            None => Ok(format!("sqlite://{}", paths::database_file()?.display())),
        }
    }

    /// The object storage root, defaulting to `~/.keeper/objects`.
    pub fn storage_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.root {
            Some(root) => Ok(paths::expand_tilde(&root.to_string_lossy())),
            None => paths::objects_dir(),
        }
    }
}
