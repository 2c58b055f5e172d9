//! Table layout of each secret kind.

use keeper_core::{CardInfo, Credentials, Note};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// A record type that [`crate::SqlSecrets`] can persist.
///
/// Each kind lives in its own table keyed by `(user_id, id)`. `COLUMNS` are
/// the field columns in the order [`SecretKind::values`] yields them.
pub trait SecretKind: Send + Sync + Unpin + Sized + 'static {
    /// Human-readable name used in error messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Column projected into key listings.
    const LIST_COLUMN: &'static str;

    fn values(&self) -> Vec<&str>;

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

impl SecretKind for Note {
    const NAME: &'static str = "note";
    const TABLE: &'static str = "texts";
    const COLUMNS: &'static [&'static str] = &["note_key", "note_text", "metadata"];
    const LIST_COLUMN: &'static str = "note_key";

    fn values(&self) -> Vec<&str> {
        vec![self.key.as_str(), self.text.as_str(), self.metadata.as_str()]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("note_key")?,
            text: row.try_get("note_text")?,
            metadata: row.try_get("metadata")?,
        })
    }
}

impl SecretKind for Credentials {
    const NAME: &'static str = "credentials";
    const TABLE: &'static str = "credentials";
    const COLUMNS: &'static [&'static str] = &["site", "login", "password", "metadata"];
    const LIST_COLUMN: &'static str = "site";

    fn values(&self) -> Vec<&str> {
        vec![
            self.site.as_str(),
            self.login.as_str(),
            self.password.as_str(),
            self.metadata.as_str(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            site: row.try_get("site")?,
            login: row.try_get("login")?,
            password: row.try_get("password")?,
            metadata: row.try_get("metadata")?,
        })
    }
}

impl SecretKind for CardInfo {
    const NAME: &'static str = "card";
    const TABLE: &'static str = "cards";
    const COLUMNS: &'static [&'static str] = &["number", "expiration", "cvv", "metadata"];
    const LIST_COLUMN: &'static str = "number";

    fn values(&self) -> Vec<&str> {
        vec![
            self.number.as_str(),
            self.expiration.as_str(),
            self.cvv.as_str(),
            self.metadata.as_str(),
        ]
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        // The id is addressed separately and not echoed in the record
        Ok(Self {
            id: None,
            number: row.try_get("number")?,
            expiration: row.try_get("expiration")?,
            cvv: row.try_get("cvv")?,
            metadata: row.try_get("metadata")?,
        })
    }
}
