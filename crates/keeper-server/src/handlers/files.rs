//! File secrets over multipart uploads.

use std::io::Cursor;
use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use keeper_core::{KeeperError, KeyListing};
use keeper_files::CreateFileDto;
use tracing::debug;

use super::CreatedId;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Multipart part carrying the file content.
pub const FILE_PART: &str = "file";
/// Multipart part carrying the sealed metadata.
pub const METADATA_PART: &str = "Metadata";
/// Response header carrying the sealed metadata.
pub const META_HEADER: &str = "meta";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/file", post(upload))
        .route("/file/:id", get(download).delete(remove))
        .route("/files", get(list))
}

/// `attachment; filename="<name>"` with `\` and `"` escaped.
fn content_disposition(name: &str) -> String {
    let mut value = String::with_capacity(name.len() + 24);
    value.push_str("attachment; filename=\"");
    for c in name.chars() {
        if matches!(c, '"' | '\\') {
            value.push('\\');
        }
        value.push(c);
    }
    value.push('"');
    value
}

fn bad_multipart(err: impl std::fmt::Display) -> ApiError {
    KeeperError::Validation(format!("malformed multipart body: {err}")).into()
}

async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedId>), ApiError> {
    let mut file = None;
    let mut metadata = String::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some(FILE_PART) => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((name, bytes));
            }
            Some(METADATA_PART) => {
                metadata = field.text().await.map_err(bad_multipart)?;
            }
            other => debug!(part = ?other, "Ignoring multipart part"),
        }
    }

    let (name, bytes) = file
        .ok_or_else(|| KeeperError::Validation(format!("missing '{FILE_PART}' part")))?;
    if name.is_empty() {
        return Err(KeeperError::Validation("missing file name".to_string()).into());
    }

    let dto = CreateFileDto {
        name,
        size: bytes.len() as u64,
        metadata,
        content: Box::new(Cursor::new(bytes)),
    };
    let id = state.files.create(&owner_id, dto).await?;
    Ok((StatusCode::CREATED, Json(CreatedId { id })))
}

async fn download(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(HeaderMap, Vec<u8>), ApiError> {
    let file = state.files.get_file(&owner_id, &id).await?;

    let header = |value: String| {
        HeaderValue::from_bytes(value.as_bytes())
            .map_err(|e| KeeperError::storage_msg(format!("unencodable header: {e}")))
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        CONTENT_DISPOSITION,
        header(content_disposition(&file.name))?,
    );
    headers.insert(HeaderName::from_static(META_HEADER), header(file.metadata)?);

    Ok((headers, file.bytes))
}

async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
) -> Result<Json<Vec<KeyListing>>, ApiError> {
    let files = state.files.get_files_list(&owner_id).await?;
    Ok(Json(files))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(owner_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.files.delete(&owner_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::content_disposition;
    use crate::handlers::CreatedId;
    use crate::test_support::{delete, get, send_multipart, TestApp};
    use axum::http::header::CONTENT_DISPOSITION;
    use axum::http::StatusCode;
    use keeper_core::KeyListing;

    #[tokio::test]
    async fn test_file_lifecycle() {
        let app = TestApp::new().await;
        let token = app.register("alice", "pw").await;

        let file = ("annual report.pdf", &b"%PDF-1.4"[..]);
        let created = send_multipart(&app.router, &token, Some(file), "beef").await;
        assert_eq!(created.status, StatusCode::CREATED);
        let CreatedId { id } = created.json();

        let path = format!("/api/secret/file/{id}");
        let fetched = get(&app.router, &path, &token).await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.body, b"%PDF-1.4");
        assert_eq!(fetched.headers.get("meta").unwrap(), "beef");
        assert_eq!(
            fetched.headers.get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"annual_report.pdf\""
        );

        let keys: Vec<KeyListing> = get(&app.router, "/api/secret/files", &token).await.json();
        assert_eq!(keys, vec![KeyListing::new(id.clone(), "annual_report.pdf")]);

        let deleted = delete(&app.router, &path, &token).await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);
        let gone = get(&app.router, &path, &token).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_without_file_part_is_bad_request() {
        let app = TestApp::new().await;
        let token = app.register("alice", "pw").await;

        let response = send_multipart(&app.router, &token, None, "beef").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_files_are_owner_scoped() {
        let app = TestApp::new().await;
        let alice = app.register("alice", "pw").await;
        let bob = app.register("bob", "pw").await;

        let CreatedId { id } = send_multipart(&app.router, &alice, Some(("a.txt", &b"x"[..])), "")
            .await
            .json();

        let response = get(&app.router, &format!("/api/secret/file/{id}"), &bob).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        let keys: Vec<KeyListing> = get(&app.router, "/api/secret/files", &bob).await.json();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_content_disposition_escapes_quotes() {
        assert_eq!(
            content_disposition(r#"say "hi"\now.txt"#),
            r#"attachment; filename="say \"hi\"\\now.txt""#
        );
    }

    #[tokio::test]
    async fn test_download_name_keeps_semicolon() {
        let app = TestApp::new().await;
        let token = app.register("alice", "pw").await;

        let file = ("q1;q2 report.txt", &b"totals"[..]);
        let CreatedId { id } = send_multipart(&app.router, &token, Some(file), "").await.json();

        let fetched = get(&app.router, &format!("/api/secret/file/{id}"), &token).await;
        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(
            fetched.headers.get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"q1;q2_report.txt\""
        );
    }
}
