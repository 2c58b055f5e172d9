//! Server error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keeper_core::{ErrorKind, KeeperError};
use thiserror::Error;
use tracing::error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Domain or backend error.
    #[error(transparent)]
    Keeper(#[from] KeeperError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An error returned from a request handler.
///
/// Rendered as a plain-text body with a status derived from the error kind.
#[derive(Debug)]
pub struct ApiError(pub KeeperError);

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind())
    }
}

/// Map an error classification to an HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::Decode => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<KeeperError> for ApiError {
    fn from(err: KeeperError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            // Backend details stay in the log
            error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, body).into_response()
    }
}
