//! Schema migrations.
//!
//! Statements are idempotent and run in order on every pool open.

use keeper_core::{KeeperError, Result};
use sqlx::SqlitePool;

const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        login TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL,
        issued_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS sessions_issued_at ON sessions (issued_at)",
    "CREATE TABLE IF NOT EXISTS texts (
        user_id TEXT NOT NULL,
        id TEXT NOT NULL,
        note_key TEXT NOT NULL,
        note_text TEXT NOT NULL,
        metadata TEXT NOT NULL,
        PRIMARY KEY (user_id, id)
    )",
    "CREATE TABLE IF NOT EXISTS credentials (
        user_id TEXT NOT NULL,
        id TEXT NOT NULL,
        site TEXT NOT NULL,
        login TEXT NOT NULL,
        password TEXT NOT NULL,
        metadata TEXT NOT NULL,
        PRIMARY KEY (user_id, id)
    )",
    "CREATE TABLE IF NOT EXISTS cards (
        user_id TEXT NOT NULL,
        id TEXT NOT NULL,
        number TEXT NOT NULL,
        expiration TEXT NOT NULL,
        cvv TEXT NOT NULL,
        metadata TEXT NOT NULL,
        PRIMARY KEY (user_id, id)
    )",
];

pub(crate) async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in MIGRATIONS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(KeeperError::storage)?;
    }
    Ok(())
}
