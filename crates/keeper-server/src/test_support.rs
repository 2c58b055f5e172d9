//! Helpers for driving the router in-process.

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

use crate::server::{Server, ServerConfig};

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    /// A server over an in-memory database and in-memory file storage.
    pub async fn new() -> Self {
        let server = Server::new(ServerConfig::default()).await.unwrap();
        Self {
            router: server.router(),
        }
    }

    /// Register an account and return its bearer token.
    pub async fn register(&self, login: &str, password: &str) -> String {
        let response = send(
            &self.router,
            Method::POST,
            "/api/user/register",
            None,
            Some(json!({"login": login, "password": password})),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
        let header = response.headers.get(AUTHORIZATION).unwrap().to_str().unwrap();
        header.trim_start_matches("Bearer ").to_string()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

async fn dispatch(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: body.to_vec(),
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    dispatch(router, request).await
}

pub async fn get(router: &Router, uri: &str, token: &str) -> TestResponse {
    send(router, Method::GET, uri, Some(token), None).await
}

pub async fn delete(router: &Router, uri: &str, token: &str) -> TestResponse {
    send(router, Method::DELETE, uri, Some(token), None).await
}

/// Upload through `/api/secret/file`. `file` is `(name, content)`.
pub async fn send_multipart(
    router: &Router,
    token: &str,
    file: Option<(&str, &[u8])>,
    metadata: &str,
) -> TestResponse {
    const BOUNDARY: &str = "keeper-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"Metadata\"\r\n\r\n");
    body.extend_from_slice(format!("{metadata}\r\n").as_bytes());
    if let Some((name, content)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/secret/file")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    dispatch(router, request).await
}
