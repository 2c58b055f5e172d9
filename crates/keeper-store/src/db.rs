//! Pool construction and backend error classification.

use std::str::FromStr;

use keeper_core::{KeeperError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, error};

use crate::schema;

/// Open a SQLite pool at `url` and apply the schema.
///
/// In-memory databases get a single connection that is never recycled, so
/// every query sees the same database.
pub async fn open_pool(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(KeeperError::storage)?
        .create_if_missing(true);

    let pool_options = if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(8)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(KeeperError::storage)?;

    schema::migrate(&pool).await?;
    debug!(url, "Opened database");
    Ok(pool)
}

/// Classify a backend error.
///
/// `RowNotFound` becomes `NotFound`, a uniqueness violation becomes
/// `Conflict`, anything else is an opaque `Storage` error.
pub(crate) fn classify(err: sqlx::Error, what: &str) -> KeeperError {
    match err {
        sqlx::Error::RowNotFound => KeeperError::NotFound(what.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            KeeperError::Conflict(format!("{what} already exists"))
        }
        other => {
            error!(error = %other, "Database operation failed: {what}");
            KeeperError::storage(other)
        }
    }
}
