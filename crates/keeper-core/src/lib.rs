//! # keeper-core
//!
//! Core types, encryption, and configuration for keeper.
//!
//! This crate provides shared functionality used across all keeper crates:
//!
//! - **Crypto**: field-level sealing/opening with a passphrase-derived key
//! - **Types**: secret records, users, files, and wire request shapes
//! - **Validation**: turning wire requests into domain records
//! - **Configuration**: loading, validation, and persistence of config files

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod paths;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ErrorKind, KeeperError, Result};
pub use secret::SecretString;
pub use types::*;
