//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KeeperError, Result};
use crate::id;
use crate::secret::SecretString;

/// A registered account.
///
/// `password_hash` is a PHC-format hash; the plaintext password is never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub login: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a fresh id.
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: id::new_id(),
            login: login.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Body of the register and login requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: SecretString,
}

impl LoginRequest {
    pub fn new(login: impl Into<String>, password: SecretString) -> Self {
        Self {
            login: login.into(),
            password,
        }
    }

    /// Both fields must be non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.login.is_empty() || self.password.is_empty() {
            return Err(KeeperError::Validation(
                "missing login or password".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_gets_id_and_timestamp() {
        let before = Utc::now();
        let user = User::new("alice", "$argon2id$...");
        assert!(!user.id.is_empty());
        assert!(user.created_at >= before);
        assert_eq!(user.login, "alice");
    }

    #[test]
    fn test_login_request_validate() {
        assert!(LoginRequest::new("alice", "pw".into()).validate().is_ok());
        assert!(LoginRequest::new("", "pw".into()).validate().is_err());
        assert!(LoginRequest::new("alice", "".into()).validate().is_err());

        let parsed: LoginRequest = serde_json::from_str(r#"{"login":"bob"}"#).unwrap();
        assert!(parsed.validate().is_err());
    }
}
