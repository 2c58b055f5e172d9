//! HTTP client for the keeper server.

use keeper_core::{
    CardInfo, CreateCardRequest, CreateCredentialsRequest, CreateNoteRequest, Credentials, File,
    KeeperError, KeyListing, LoginRequest, Note, SecretFields, SecretString, UpdateCardRequest,
    UpdateCredentialsRequest, UpdateNoteRequest,
};
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by [`KeeperClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never got a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("Server returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The server answered with something the client cannot use.
    #[error("Unexpected response: {0}")]
    Protocol(String),

    /// Local sealing or opening failed.
    #[error(transparent)]
    Keeper(#[from] KeeperError),
}

impl ClientError {
    /// The HTTP status, when the server answered with an error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// A secret kind as the client sends and receives it.
pub trait RemoteSecret: SecretFields + Serialize + DeserializeOwned + Send + Sync {
    /// Path segment of a single record.
    const ONE: &'static str;
    /// Path segment of the key listing.
    const MANY: &'static str;

    type Create: Serialize + Send;
    type Update: Serialize + Send;

    fn create_request(&self) -> Self::Create;

    fn update_request(&self, id: &str) -> Self::Update;
}

impl RemoteSecret for Note {
    const ONE: &'static str = "text";
    const MANY: &'static str = "texts";

    type Create = CreateNoteRequest;
    type Update = UpdateNoteRequest;

    fn create_request(&self) -> CreateNoteRequest {
        CreateNoteRequest::from(self)
    }

    fn update_request(&self, id: &str) -> UpdateNoteRequest {
        UpdateNoteRequest {
            id: id.to_string(),
            key: self.key.clone(),
            data: self.text.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl RemoteSecret for Credentials {
    const ONE: &'static str = "cred";
    const MANY: &'static str = "creds";

    type Create = CreateCredentialsRequest;
    type Update = UpdateCredentialsRequest;

    fn create_request(&self) -> CreateCredentialsRequest {
        CreateCredentialsRequest::from(self)
    }

    fn update_request(&self, id: &str) -> UpdateCredentialsRequest {
        UpdateCredentialsRequest {
            id: id.to_string(),
            site: self.site.clone(),
            login: self.login.clone(),
            password: self.password.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl RemoteSecret for CardInfo {
    const ONE: &'static str = "card";
    const MANY: &'static str = "cards";

    type Create = CreateCardRequest;
    type Update = UpdateCardRequest;

    fn create_request(&self) -> CreateCardRequest {
        CreateCardRequest::from(self)
    }

    fn update_request(&self, id: &str) -> UpdateCardRequest {
        UpdateCardRequest {
            id: id.to_string(),
            number: self.number.clone(),
            expiration: self.expiration.clone(),
            cvv: self.cvv.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[derive(Deserialize)]
struct CreatedId {
    id: String,
}

/// Client for one keeper server.
///
/// Records passed in and returned are exactly what travels on the wire;
/// sealing and opening are up to the caller.
#[derive(Clone)]
pub struct KeeperClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl KeeperClient {
    /// Create a client for the server at `base_url`, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Whether a session token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn secret_url(&self, path: &str) -> String {
        self.url(&format!("/api/secret/{path}"))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| KeeperError::Unauthorized("not logged in".to_string()))?;
        Ok(request.header(AUTHORIZATION, format!("Bearer {token}")))
    }

    /// Check that the server is reachable.
    pub async fn ping(&self) -> Result<()> {
        let response = self.http.get(self.url("/ping")).send().await?;
        check(response).await?;
        Ok(())
    }

    /// Create an account and keep its session.
    pub async fn register(&mut self, login: &str, password: &SecretString) -> Result<()> {
        self.start_session("/api/user/register", login, password).await
    }

    /// Log in and keep the session.
    pub async fn login(&mut self, login: &str, password: &SecretString) -> Result<()> {
        self.start_session("/api/user/login", login, password).await
    }

    async fn start_session(
        &mut self,
        path: &str,
        login: &str,
        password: &SecretString,
    ) -> Result<()> {
        let body = LoginRequest::new(login, password.clone());
        let response = self.http.post(self.url(path)).json(&body).send().await?;
        let response = check(response).await?;

        let token = response
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ClientError::Protocol("missing session token".to_string()))?;
        self.token = Some(token.to_string());
        Ok(())
    }

    /// Store a record, returning its server-assigned id.
    pub async fn create_secret<T: RemoteSecret>(&self, record: &T) -> Result<String> {
        let request = self
            .http
            .post(self.secret_url(T::ONE))
            .json(&record.create_request());
        let response = check(self.authorized(request)?.send().await?).await?;
        let created: CreatedId = response.json().await?;
        Ok(created.id)
    }

    pub async fn get_secret<T: RemoteSecret>(&self, id: &str) -> Result<T> {
        let request = self.http.get(self.secret_url(&format!("{}/{id}", T::ONE)));
        let response = check(self.authorized(request)?.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn list_secrets<T: RemoteSecret>(&self) -> Result<Vec<KeyListing>> {
        let request = self.http.get(self.secret_url(T::MANY));
        let response = check(self.authorized(request)?.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Replace every field of the record `id`.
    pub async fn update_secret<T: RemoteSecret>(&self, id: &str, record: &T) -> Result<()> {
        let request = self
            .http
            .put(self.secret_url(T::ONE))
            .json(&record.update_request(id));
        check(self.authorized(request)?.send().await?).await?;
        Ok(())
    }

    pub async fn delete_secret<T: RemoteSecret>(&self, id: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.secret_url(&format!("{}/{id}", T::ONE)));
        check(self.authorized(request)?.send().await?).await?;
        Ok(())
    }

    /// Upload a file with (already sealed) metadata, returning its id.
    pub async fn upload_file(
        &self,
        name: &str,
        bytes: Vec<u8>,
        metadata: &str,
    ) -> Result<String> {
        let form = Form::new()
            .percent_encode_noop()
            .text("Metadata", metadata.to_string())
            .part("file", Part::bytes(bytes).file_name(name.to_string()));
        let request = self.http.post(self.secret_url("file")).multipart(form);
        let response = check(self.authorized(request)?.send().await?).await?;
        let created: CreatedId = response.json().await?;
        Ok(created.id)
    }

    /// Download a file. `metadata` is returned as stored.
    pub async fn get_file(&self, id: &str) -> Result<File> {
        let request = self.http.get(self.secret_url(&format!("file/{id}")));
        let response = check(self.authorized(request)?.send().await?).await?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        };
        let metadata = header("meta").unwrap_or_default();
        let name = header(CONTENT_DISPOSITION.as_str())
            .and_then(|value| attachment_name(&value))
            .unwrap_or_else(|| id.to_string());

        let bytes = response.bytes().await?.to_vec();
        Ok(File {
            id: id.to_string(),
            name,
            size: bytes.len() as u64,
            bytes,
            metadata,
        })
    }

    pub async fn list_files(&self) -> Result<Vec<KeyListing>> {
        let request = self.http.get(self.secret_url("files"));
        let response = check(self.authorized(request)?.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_file(&self, id: &str) -> Result<()> {
        let request = self.http.delete(self.secret_url(&format!("file/{id}")));
        check(self.authorized(request)?.send().await?).await?;
        Ok(())
    }
}

/// Turn an error status into [`ClientError::Status`] carrying the body text.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, message })
}

/// Extract the file name from `attachment; filename="name"`. Backslash escapes
/// inside the quotes are undone; an unquoted name ends at the next `;`.
fn attachment_name(disposition: &str) -> Option<String> {
    let (_, rest) = disposition.split_once("filename=")?;
    let name = match rest.strip_prefix('"') {
        Some(quoted) => {
            let mut name = String::new();
            let mut chars = quoted.chars();
            loop {
                match chars.next()? {
                    '"' => break,
                    '\\' => name.push(chars.next()?),
                    c => name.push(c),
                }
            }
            name
        }
        None => rest.split(';').next().unwrap_or_default().trim().to_string(),
    };
    Some(name).filter(|name| !name.is_empty())
}
