//! HTTP server for keeper.
//!
//! This crate provides:
//! - Account registration and login with bearer session tokens
//! - Owner-scoped CRUD endpoints for notes, credentials and cards
//! - Multipart file upload, download, listing and deletion

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;

pub use auth::AuthUser;
pub use error::{ApiError, ServerError};
pub use server::{Server, ServerConfig, StorageConfig};
pub use state::AppState;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
