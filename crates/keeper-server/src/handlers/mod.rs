//! Request handlers.

pub mod files;
pub mod secrets;
pub mod users;

use serde::{Deserialize, Serialize};

/// Body returned when a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedId {
    pub id: String,
}

/// Liveness check.
pub async fn ping() -> &'static str {
    "pong"
}
