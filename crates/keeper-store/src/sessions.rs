//! Bearer session tokens.

use std::time::Duration;

use chrono::Utc;
use keeper_core::{id, KeeperError, Result};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::db::classify;

/// Opaque session tokens mapped to their owner, valid for a fixed TTL.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Issue a fresh token for `user_id`. Expired tokens are purged first.
    pub async fn issue(&self, user_id: &str) -> Result<String> {
        self.purge_expired().await?;

        let token = id::new_id();
        sqlx::query("INSERT INTO sessions (token, user_id, issued_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "session"))?;

        debug!(user_id, "Issued session token");
        Ok(token)
    }

    /// Resolve a token to its owner id.
    ///
    /// Unknown and expired tokens are both `Unauthorized`. An expired token is
    /// deleted on the way out.
    pub async fn resolve(&self, token: &str) -> Result<String> {
        let row = sqlx::query("SELECT user_id, issued_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, "session"))?
            .ok_or_else(|| KeeperError::Unauthorized("unknown session token".to_string()))?;

        let issued_at: i64 = row.try_get("issued_at").map_err(|e| classify(e, "session"))?;
        if issued_at.saturating_add(self.ttl_secs()) <= Utc::now().timestamp() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await
                .map_err(|e| classify(e, "session"))?;
            debug!("Dropped expired session token");
            return Err(KeeperError::Unauthorized(
                "session token expired".to_string(),
            ));
        }

        row.try_get("user_id").map_err(|e| classify(e, "session"))
    }

    /// Delete every expired token, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let cutoff = Utc::now().timestamp().saturating_sub(self.ttl_secs());
        let result = sqlx::query("DELETE FROM sessions WHERE issued_at <= ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, "session"))?;

        let purged = result.rows_affected();
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }
        Ok(purged)
    }
}
