//! Owner-scoped CRUD for the structured secret kinds.
//!
//! One set of generic handlers serves notes, credentials and cards; the
//! [`SecretRoute`] impl of each kind picks its request shapes and store.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use keeper_core::{
    id, CardInfo, CreateCardRequest, CreateCredentialsRequest, CreateNoteRequest, Credentials,
    KeyListing, Note, UpdateCardRequest, UpdateCredentialsRequest, UpdateNoteRequest,
    ValidateCreate, ValidateUpdate,
};
use keeper_store::{SecretKind, Secrets, SqlSecrets};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::CreatedId;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// A secret kind served over HTTP.
pub trait SecretRoute: SecretKind + Serialize {
    type Create: ValidateCreate<Record = Self> + DeserializeOwned + Send + 'static;
    type Update: ValidateUpdate<Record = Self> + DeserializeOwned + Send + 'static;

    fn store(state: &AppState) -> &SqlSecrets<Self>;
}

impl SecretRoute for Note {
    type Create = CreateNoteRequest;
    type Update = UpdateNoteRequest;

    fn store(state: &AppState) -> &SqlSecrets<Self> {
        &state.store.notes
    }
}

impl SecretRoute for Credentials {
    type Create = CreateCredentialsRequest;
    type Update = UpdateCredentialsRequest;

    fn store(state: &AppState) -> &SqlSecrets<Self> {
        &state.store.credentials
    }
}

impl SecretRoute for CardInfo {
    type Create = CreateCardRequest;
    type Update = UpdateCardRequest;

    fn store(state: &AppState) -> &SqlSecrets<Self> {
        &state.store.cards
    }
}

/// Routes for one kind: `/{one}` and `/{one}/:id` for records, `/{many}` for
/// the key listing.
pub fn routes<T: SecretRoute>(one: &str, many: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("/{one}"), post(create::<T>).put(update::<T>))
        .route(&format!("/{one}/:id"), get(fetch::<T>).delete(remove::<T>))
        .route(&format!("/{many}"), get(list::<T>))
}

async fn create<T: SecretRoute>(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Json(request): Json<T::Create>,
) -> Result<(StatusCode, Json<CreatedId>), ApiError> {
    let record = request.validate()?;
    let id = id::new_id();
    T::store(&state).create(&owner_id, &id, &record).await?;
    Ok((StatusCode::ACCEPTED, Json(CreatedId { id })))
}

async fn fetch<T: SecretRoute>(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiError> {
    let record = T::store(&state).get(&owner_id, &id).await?;
    Ok(Json(record))
}

async fn list<T: SecretRoute>(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
) -> Result<Json<Vec<KeyListing>>, ApiError> {
    let keys = T::store(&state).get_keys_list(&owner_id).await?;
    Ok(Json(keys))
}

async fn update<T: SecretRoute>(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Json(request): Json<T::Update>,
) -> Result<StatusCode, ApiError> {
    let (id, record) = request.validate()?;
    T::store(&state).update(&owner_id, &id, &record).await?;
    Ok(StatusCode::OK)
}

async fn remove<T: SecretRoute>(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    T::store(&state).delete(&owner_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
