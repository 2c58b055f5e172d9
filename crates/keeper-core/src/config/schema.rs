//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main keeper configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// File object storage settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Client CLI settings.
    #[serde(default)]
    pub client: ClientSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address, `host:port`.
    #[serde(default = "default_address")]
    pub address: String,

    /// SQLite connection URL. Defaults to `~/.keeper/keeper.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Maximum request body size.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Session token lifetime.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            database_url: None,
            body_limit_bytes: default_body_limit(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_body_limit() -> usize {
    32 * 1024 * 1024
}

fn default_token_ttl() -> u64 {
    24 * 60 * 60
}

/// Object storage section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the filesystem backend. Defaults to `~/.keeper/objects`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Bound on a bucket listing.
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,

    /// Bound on a single upload.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: None,
            list_timeout_secs: default_list_timeout(),
            upload_timeout_secs: default_upload_timeout(),
        }
    }
}

fn default_list_timeout() -> u64 {
    5
}

fn default_upload_timeout() -> u64 {
    10
}

/// Object storage backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Directory per owner on the local filesystem.
    #[default]
    Fs,

    /// In-process map, lost on restart.
    Memory,
}

/// Client section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Server base URL, e.g. `http://127.0.0.1:8080`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Account login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
