//! Secret record types.
//!
//! Every textual field here is ciphertext produced by [`crate::crypto::seal`]
//! by the time it reaches the server. The server stores and returns the
//! fields verbatim; only the client opens them.

use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::error::Result;

/// A free-form text note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub key: String,
    pub text: String,
    pub metadata: String,
}

/// A site login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub site: String,
    pub login: String,
    pub password: String,
    pub metadata: String,
}

/// Payment card data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub number: String,
    pub expiration: String,
    pub cvv: String,
    pub metadata: String,
}

/// The id and one representative field of a stored secret, for list views.
///
/// `key` is still ciphertext for secret kinds; for files it is the stored
/// file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyListing {
    pub id: String,
    pub key: String,
}

impl KeyListing {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

/// Field-wise sealing for the structured secret kinds.
///
/// Implementors only describe how to rebuild themselves with every textual
/// field passed through a function; sealing and opening are derived from that.
pub trait SecretFields: Sized {
    /// Rebuild the record with every sealed field mapped through `f`.
    fn map_fields<F>(&self, f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>;

    /// Seal every field under `passphrase`.
    fn seal(&self, passphrase: &str) -> Result<Self> {
        self.map_fields(|field| crypto::seal(passphrase, field))
    }

    /// Open every field with `passphrase`.
    fn open(&self, passphrase: &str) -> Result<Self> {
        self.map_fields(|field| crypto::open(passphrase, field))
    }
}

impl SecretFields for Note {
    fn map_fields<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(Self {
            key: f(&self.key)?,
            text: f(&self.text)?,
            metadata: f(&self.metadata)?,
        })
    }
}

impl SecretFields for Credentials {
    fn map_fields<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(Self {
            site: f(&self.site)?,
            login: f(&self.login)?,
            password: f(&self.password)?,
            metadata: f(&self.metadata)?,
        })
    }
}

impl SecretFields for CardInfo {
    fn map_fields<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<String>,
    {
        Ok(Self {
            id: self.id.clone(),
            number: f(&self.number)?,
            expiration: f(&self.expiration)?,
            cvv: f(&self.cvv)?,
            metadata: f(&self.metadata)?,
        })
    }
}

/// Mask a card number down to its last four characters, e.g. `*1111`.
pub fn mask_card_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("*{tail}")
}
