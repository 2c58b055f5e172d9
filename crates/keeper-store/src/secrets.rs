//! The owner-scoped secret store.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use keeper_core::{KeeperError, KeyListing, Result};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::db::classify;
use crate::kinds::SecretKind;

/// CRUD over one secret kind, scoped to an owner.
///
/// Every method takes the owner id first; a record created by one owner is
/// invisible to every other owner and surfaces as `NotFound` to them.
#[async_trait]
pub trait Secrets<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Insert `record` under a caller-chosen `id`.
    ///
    /// Fails with `Conflict` when the owner already has a record with `id`.
    async fn create(&self, owner_id: &str, id: &str, record: &T) -> Result<()>;

    /// Fetch one record.
    async fn get(&self, owner_id: &str, id: &str) -> Result<T>;

    /// List `(id, representative field)` for every record of the owner.
    ///
    /// An owner with no records gets an empty list, not an error.
    async fn get_keys_list(&self, owner_id: &str) -> Result<Vec<KeyListing>>;

    /// Replace every field of an existing record.
    ///
    /// Fails with `NotFound` unless exactly one row was changed.
    async fn update(&self, owner_id: &str, id: &str, record: &T) -> Result<()>;

    /// Remove a record. Fails with `NotFound` unless exactly one row went away.
    async fn delete(&self, owner_id: &str, id: &str) -> Result<()>;
}

struct Queries {
    insert: String,
    select: String,
    list: String,
    update: String,
    delete: String,
}

impl Queries {
    fn for_kind<T: SecretKind>() -> Self {
        let table = T::TABLE;
        let columns = T::COLUMNS.join(", ");
        let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
        let assignments = T::COLUMNS
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            insert: format!(
                "INSERT INTO {table} (user_id, id, {columns}) VALUES (?, ?, {placeholders})"
            ),
            select: format!("SELECT {columns} FROM {table} WHERE user_id = ? AND id = ?"),
            list: format!(
                "SELECT id, {} AS list_key FROM {table} WHERE user_id = ?",
                T::LIST_COLUMN
            ),
            update: format!("UPDATE {table} SET {assignments} WHERE user_id = ? AND id = ?"),
            delete: format!("DELETE FROM {table} WHERE user_id = ? AND id = ?"),
        }
    }
}

/// SQLite-backed [`Secrets`] for any [`SecretKind`].
pub struct SqlSecrets<T> {
    pool: SqlitePool,
    sql: Arc<Queries>,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for SqlSecrets<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            sql: Arc::clone(&self.sql),
            _kind: PhantomData,
        }
    }
}

impl<T: SecretKind> SqlSecrets<T> {
    /// Create a store over a migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            sql: Arc::new(Queries::for_kind::<T>()),
            _kind: PhantomData,
        }
    }

    fn not_found(id: &str) -> KeeperError {
        KeeperError::NotFound(format!("{} '{}'", T::NAME, id))
    }
}

fn require_ids(owner_id: &str, id: &str) -> Result<()> {
    if owner_id.is_empty() {
        return Err(KeeperError::Validation("missing owner id".to_string()));
    }
    if id.is_empty() {
        return Err(KeeperError::Validation("missing id".to_string()));
    }
    Ok(())
}

#[async_trait]
impl<T: SecretKind> Secrets<T> for SqlSecrets<T> {
    async fn create(&self, owner_id: &str, id: &str, record: &T) -> Result<()> {
        require_ids(owner_id, id)?;

        let mut query = sqlx::query(&self.sql.insert).bind(owner_id).bind(id);
        for value in record.values() {
            query = query.bind(value);
        }
        query
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, &format!("{} '{}'", T::NAME, id)))?;

        debug!(owner_id, id, kind = T::NAME, "Created secret");
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<T> {
        require_ids(owner_id, id)?;

        let row = sqlx::query(&self.sql.select)
            .bind(owner_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, T::NAME))?
            .ok_or_else(|| Self::not_found(id))?;

        T::from_row(&row).map_err(|e| classify(e, T::NAME))
    }

    async fn get_keys_list(&self, owner_id: &str) -> Result<Vec<KeyListing>> {
        if owner_id.is_empty() {
            return Err(KeeperError::Validation("missing owner id".to_string()));
        }

        let rows = sqlx::query(&self.sql.list)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(e, T::NAME))?;

        rows.iter()
            .map(|row| -> std::result::Result<KeyListing, sqlx::Error> {
                Ok(KeyListing::new(
                    row.try_get::<String, _>("id")?,
                    row.try_get::<String, _>("list_key")?,
                ))
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| classify(e, T::NAME))
    }

    async fn update(&self, owner_id: &str, id: &str, record: &T) -> Result<()> {
        require_ids(owner_id, id)?;

        let mut query = sqlx::query(&self.sql.update);
        for value in record.values() {
            query = query.bind(value);
        }
        let result = query
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, T::NAME))?;

        if result.rows_affected() != 1 {
            return Err(Self::not_found(id));
        }

        debug!(owner_id, id, kind = T::NAME, "Updated secret");
        Ok(())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        require_ids(owner_id, id)?;

        let result = sqlx::query(&self.sql.delete)
            .bind(owner_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify(e, T::NAME))?;

        if result.rows_affected() != 1 {
            return Err(Self::not_found(id));
        }

        debug!(owner_id, id, kind = T::NAME, "Deleted secret");
        Ok(())
    }
}
