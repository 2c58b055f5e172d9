//! # keeper-store
//!
//! Relational persistence for keeper.
//!
//! Every secret kind is stored through one generic implementation,
//! [`SqlSecrets`], parameterized by a [`SecretKind`] that names its table and
//! columns. All queries are scoped by owner id; nothing reads or writes a row
//! by record id alone.

mod db;
mod kinds;
mod schema;
mod secrets;
mod sessions;
mod users;

pub use db::open_pool;
pub use kinds::SecretKind;
pub use secrets::{Secrets, SqlSecrets};
pub use sessions::SessionStore;
pub use users::UserStore;

use std::time::Duration;

use keeper_core::{CardInfo, Credentials, Note, Result};
use sqlx::SqlitePool;

/// All repositories over one connection pool.
#[derive(Clone)]
pub struct Store {
    pub notes: SqlSecrets<Note>,
    pub credentials: SqlSecrets<Credentials>,
    pub cards: SqlSecrets<CardInfo>,
    pub users: UserStore,
    pub sessions: SessionStore,
}

impl Store {
    /// Open (and migrate) the database at `url`.
    pub async fn open(url: &str, token_ttl: Duration) -> Result<Self> {
        let pool = open_pool(url).await?;
        Ok(Self::from_pool(pool, token_ttl))
    }

    /// Build the repositories over an already-migrated pool.
    pub fn from_pool(pool: SqlitePool, token_ttl: Duration) -> Self {
        Self {
            notes: SqlSecrets::new(pool.clone()),
            credentials: SqlSecrets::new(pool.clone()),
            cards: SqlSecrets::new(pool.clone()),
            users: UserStore::new(pool.clone()),
            sessions: SessionStore::new(pool, token_ttl),
        }
    }
}
