//! Wire request shapes and their validation.
//!
//! Fields are opaque ciphertext, so validation only checks that the
//! identifying fields are present. Nothing inspects field content.

use serde::{Deserialize, Serialize};

use crate::error::{KeeperError, Result};
use crate::types::{CardInfo, Credentials, Note};

/// A create request that validates into a domain record.
pub trait ValidateCreate {
    type Record;

    fn validate(self) -> Result<Self::Record>;
}

/// An update request that validates into `(target id, replacement record)`.
pub trait ValidateUpdate {
    type Record;

    fn validate(self) -> Result<(String, Self::Record)>;
}

fn require(fields: &[(&str, &str)], condition: &str) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(KeeperError::Validation(format!(
            "{condition}: missing {}",
            missing.join(", ")
        )))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default, alias = "text")]
    pub data: String,
    #[serde(default)]
    pub metadata: String,
}

impl ValidateCreate for CreateNoteRequest {
    type Record = Note;

    fn validate(self) -> Result<Note> {
        require(&[("key", self.key.as_str())], "incorrect key")?;
        Ok(Note {
            key: self.key,
            text: self.data,
            metadata: self.metadata,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default, alias = "text")]
    pub data: String,
    #[serde(default)]
    pub metadata: String,
}

impl ValidateUpdate for UpdateNoteRequest {
    type Record = Note;

    fn validate(self) -> Result<(String, Note)> {
        require(&[("id", self.id.as_str()), ("key", self.key.as_str())], "incorrect request")?;
        Ok((
            self.id,
            Note {
                key: self.key,
                text: self.data,
                metadata: self.metadata,
            },
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCredentialsRequest {
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub metadata: String,
}

impl ValidateCreate for CreateCredentialsRequest {
    type Record = Credentials;

    fn validate(self) -> Result<Credentials> {
        require(
            &[("site", self.site.as_str()), ("login", self.login.as_str())],
            "incorrect key",
        )?;
        Ok(Credentials {
            site: self.site,
            login: self.login,
            password: self.password,
            metadata: self.metadata,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCredentialsRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub metadata: String,
}

impl ValidateUpdate for UpdateCredentialsRequest {
    type Record = Credentials;

    fn validate(self) -> Result<(String, Credentials)> {
        require(
            &[
                ("id", self.id.as_str()),
                ("site", self.site.as_str()),
                ("login", self.login.as_str()),
            ],
            "incorrect request",
        )?;
        Ok((
            self.id,
            Credentials {
                site: self.site,
                login: self.login,
                password: self.password,
                metadata: self.metadata,
            },
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub expiration: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub metadata: String,
}

impl ValidateCreate for CreateCardRequest {
    type Record = CardInfo;

    fn validate(self) -> Result<CardInfo> {
        require(
            &[
                ("number", self.number.as_str()),
                ("expiration", self.expiration.as_str()),
                ("cvv", self.cvv.as_str()),
            ],
            "incorrect data",
        )?;
        Ok(CardInfo {
            id: None,
            number: self.number,
            expiration: self.expiration,
            cvv: self.cvv,
            metadata: self.metadata,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub expiration: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub metadata: String,
}

impl ValidateUpdate for UpdateCardRequest {
    type Record = CardInfo;

    fn validate(self) -> Result<(String, CardInfo)> {
        require(
            &[
                ("id", self.id.as_str()),
                ("number", self.number.as_str()),
                ("expiration", self.expiration.as_str()),
                ("cvv", self.cvv.as_str()),
            ],
            "incorrect request",
        )?;
        Ok((
            self.id,
            CardInfo {
                id: None,
                number: self.number,
                expiration: self.expiration,
                cvv: self.cvv,
                metadata: self.metadata,
            },
        ))
    }
}

impl From<&Note> for CreateNoteRequest {
    fn from(note: &Note) -> Self {
        Self {
            key: note.key.clone(),
            data: note.text.clone(),
            metadata: note.metadata.clone(),
        }
    }
}

impl From<&Credentials> for CreateCredentialsRequest {
    fn from(creds: &Credentials) -> Self {
        Self {
            site: creds.site.clone(),
            login: creds.login.clone(),
            password: creds.password.clone(),
            metadata: creds.metadata.clone(),
        }
    }
}

impl From<&CardInfo> for CreateCardRequest {
    fn from(card: &CardInfo) -> Self {
        Self {
            number: card.number.clone(),
            expiration: card.expiration.clone(),
            cvv: card.cvv.clone(),
            metadata: card.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_note_requires_key() {
        let ok = CreateNoteRequest {
            key: "k".into(),
            data: "d".into(),
            metadata: "m".into(),
        };
        let note = ok.validate().unwrap();
        assert_eq!(note.text, "d");

        let err = CreateNoteRequest::default().validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("key"));
    }

    #[test]
    fn test_create_note_accepts_text_alias() {
        let req: CreateNoteRequest =
            serde_json::from_str(r#"{"key":"k","text":"body","metadata":""}"#).unwrap();
        assert_eq!(req.validate().unwrap().text, "body");
    }

    #[test]
    fn test_update_note_requires_id() {
        let req = UpdateNoteRequest {
            key: "k".into(),
            ..Default::default()
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn test_credentials_require_site_and_login() {
        let missing_login = CreateCredentialsRequest {
            site: "s".into(),
            password: "p".into(),
            ..Default::default()
        };
        let err = missing_login.validate().unwrap_err();
        assert!(err.to_string().contains("login"));

        let ok = CreateCredentialsRequest {
            site: "s".into(),
            login: "l".into(),
            ..Default::default()
        };
        // An empty password is allowed
        assert_eq!(ok.validate().unwrap().password, "");
    }

    #[test]
    fn test_update_credentials_validates() {
        let req = UpdateCredentialsRequest {
            id: "c1".into(),
            site: "s".into(),
            login: "l".into(),
            password: "p".into(),
            metadata: "m".into(),
        };
        let (id, creds) = req.validate().unwrap();
        assert_eq!(id, "c1");
        assert_eq!(creds.password, "p");
    }

    #[test]
    fn test_card_requires_number_expiration_cvv() {
        let req: CreateCardRequest =
            serde_json::from_str(r#"{"number":"n","expiration":"e","metadata":"m"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("cvv"));

        let req = CreateCardRequest {
            number: "n".into(),
            expiration: "e".into(),
            cvv: "c".into(),
            metadata: String::new(),
        };
        assert_eq!(req.validate().unwrap().id, None);
    }

    #[test]
    fn test_update_card_requires_id() {
        let req = UpdateCardRequest {
            number: "n".into(),
            expiration: "e".into(),
            cvv: "c".into(),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdateCardRequest {
            id: "c1".into(),
            number: "n".into(),
            expiration: "e".into(),
            cvv: "c".into(),
            metadata: "m".into(),
        };
        let (id, card) = req.validate().unwrap();
        assert_eq!(id, "c1");
        assert_eq!(card.number, "n");
    }

    #[test]
    fn test_validation_ignores_content() {
        // Not hex, not a card number: still accepted, the server can't tell
        let req = CreateCardRequest {
            number: "???".into(),
            expiration: "!".into(),
            cvv: " ".into(),
            metadata: String::new(),
        };
        assert!(req.validate().is_ok());
    }
}
