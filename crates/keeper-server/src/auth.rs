//! Password hashing and request authentication.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use keeper_core::{KeeperError, Result, SecretString};

use crate::error::ApiError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Hash an account password into a PHC string (Argon2id, random salt).
pub async fn hash_password(password: &SecretString) -> Result<String> {
    let password = password.clone();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| KeeperError::storage_msg(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(KeeperError::storage)?
}

/// Check `password` against a stored PHC hash.
pub async fn verify_password(password: &SecretString, hash: &str) -> Result<bool> {
    let password = password.clone();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || -> Result<bool> {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| KeeperError::storage_msg(format!("stored hash is invalid: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(KeeperError::storage)?
}

/// `Authorization` header value for a session token.
pub fn bearer(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}

/// The authenticated owner of a request, resolved from its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| KeeperError::Unauthorized("missing bearer token".to_string()))?;

        let owner_id = state.store.sessions.resolve(token).await?;
        Ok(Self(owner_id))
    }
}
