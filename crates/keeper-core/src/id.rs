//! ID generation utilities.

use uuid::Uuid;

/// Generate a new record, file, user or session id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check that an id is usable as a bucket or object name.
///
/// Allowed: ASCII alphanumeric, underscore, hyphen; non-empty.
pub fn is_safe_name(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
