//! Registration and login.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use keeper_core::{ErrorKind, KeeperError, LoginRequest, User};
use tracing::info;

use crate::auth::{bearer, hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;

fn with_token(token: &str) -> impl IntoResponse {
    (StatusCode::OK, [(AUTHORIZATION, bearer(token))])
}

/// Create an account and start a session.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let hash = hash_password(&request.password).await?;
    let user = User::new(request.login, hash);
    state.store.users.create_user(&user).await?;

    let token = state.store.sessions.issue(&user.id).await?;
    info!(user_id = %user.id, "Registered user");
    Ok(with_token(&token))
}

/// Start a session for an existing account.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let bad_credentials = || KeeperError::Unauthorized("invalid login or password".to_string());

    let user = match state.store.users.get_by_login(&request.login).await {
        Ok(user) => user,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(bad_credentials().into()),
        Err(e) => return Err(e.into()),
    };
    if !verify_password(&request.password, &user.password_hash).await? {
        return Err(bad_credentials().into());
    }

    let token = state.store.sessions.issue(&user.id).await?;
    Ok(with_token(&token))
}
