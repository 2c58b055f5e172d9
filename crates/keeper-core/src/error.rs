//! Error types for keeper.
//!
//! Every crate in the workspace reports failures through [`KeeperError`] so
//! the HTTP layer and the CLI can branch on one classification.

use std::path::PathBuf;
use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, KeeperError>;

/// Boxed error used as the opaque source of [`KeeperError::Storage`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for keeper operations.
#[derive(Debug, Error)]
pub enum KeeperError {
    /// Malformed or missing input. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violation on create.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No matching owned row or object.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ciphertext failed its integrity check (wrong passphrase or tampering).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Ciphertext is not valid hex, or the opened bytes are not UTF-8.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The cipher refused to seal the input.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Missing, unknown or expired session, or bad login credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any backend fault not otherwise classified.
    #[error("Storage error: {0}")]
    Storage(#[source] BoxError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Copyable classification of a [`KeeperError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Authentication,
    Decode,
    Encryption,
    Unauthorized,
    Storage,
    Config,
    Io,
    Json,
}

impl KeeperError {
    /// Wrap a backend fault as a [`KeeperError::Storage`].
    pub fn storage(err: impl Into<BoxError>) -> Self {
        Self::Storage(err.into())
    }

    /// Build a [`KeeperError::Storage`] from a plain message.
    pub fn storage_msg(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into().into())
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encryption(_) => ErrorKind::Encryption,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON5 parse error: {0}")]
    Json5(String),
}
