//! Account persistence.

use chrono::{DateTime, Utc};
use keeper_core::{KeeperError, Result, User};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::db::classify;

/// Registered accounts, unique by login.
#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account. Fails with `Conflict` when the login is taken.
    pub async fn create_user(&self, user: &User) -> Result<()> {
        if user.login.is_empty() {
            return Err(KeeperError::Validation("missing login".to_string()));
        }

        sqlx::query(
            "INSERT INTO users (id, login, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, &format!("user '{}'", user.login)))?;

        debug!(user_id = %user.id, "Created user");
        Ok(())
    }

    /// Look an account up by its exact login.
    pub async fn get_by_login(&self, login: &str) -> Result<User> {
        let row = sqlx::query(
            "SELECT id, login, password_hash, created_at FROM users WHERE login = ?",
        )
        .bind(login)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, &format!("user '{login}'")))?;

        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| classify(e, "user"))?;

        Ok(User {
            id: row.try_get("id").map_err(|e| classify(e, "user"))?,
            login: row.try_get("login").map_err(|e| classify(e, "user"))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| classify(e, "user"))?,
            created_at,
        })
    }
}
