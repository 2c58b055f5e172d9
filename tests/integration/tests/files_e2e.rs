//! End-to-end file storage tests.

use keeper_cli::ClientError;
use keeper_core::crypto;
use keeper_integration_tests::TestServer;
use keeper_server::{ServerConfig, StorageConfig};
use tempfile::TempDir;

const PASS: &str = "pw123";

fn status(err: ClientError) -> u16 {
    err.status().map(|s| s.as_u16()).unwrap_or(0)
}

#[tokio::test]
async fn test_file_lifecycle() {
    let server = TestServer::start().await;
    let client = server.registered("alice", PASS).await;

    let metadata = crypto::seal(PASS, "tax year 2025").unwrap();
    let content = b"%PDF-1.7 not really".to_vec();
    let id = client
        .upload_file("café résumé.pdf", content.clone(), &metadata)
        .await
        .unwrap();

    let file = client.get_file(&id).await.unwrap();
    assert_eq!(file.id, id);
    assert_eq!(file.name, "cafe_resume.pdf");
    assert_eq!(file.bytes, content);
    assert_eq!(file.size, content.len() as u64);
    assert_eq!(crypto::open(PASS, &file.metadata).unwrap(), "tax year 2025");

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, id);
    assert_eq!(files[0].key, "cafe_resume.pdf");

    client.delete_file(&id).await.unwrap();
    assert!(client.list_files().await.unwrap().is_empty());
    let err = client.get_file(&id).await.unwrap_err();
    assert_eq!(status(err), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_same_name_uploads_get_distinct_ids() {
    let server = TestServer::start().await;
    let client = server.registered("alice", PASS).await;

    let first = client.upload_file("a.txt", b"one".to_vec(), "").await.unwrap();
    let second = client.upload_file("a.txt", b"two".to_vec(), "").await.unwrap();
    assert_ne!(first, second);
    assert_eq!(client.list_files().await.unwrap().len(), 2);
    assert_eq!(client.get_file(&second).await.unwrap().bytes, b"two");

    server.stop().await;
}

#[tokio::test]
async fn test_download_name_with_semicolon() {
    let server = TestServer::start().await;
    let client = server.registered("alice", PASS).await;

    let id = client
        .upload_file("q1;q2 report.txt", b"totals".to_vec(), "")
        .await
        .unwrap();

    let file = client.get_file(&id).await.unwrap();
    assert_eq!(file.name, "q1;q2_report.txt");
    assert_eq!(client.list_files().await.unwrap()[0].key, "q1;q2_report.txt");

    server.stop().await;
}

#[tokio::test]
async fn test_files_are_isolated_per_owner() {
    let server = TestServer::start().await;
    let alice = server.registered("alice", PASS).await;
    let bob = server.registered("bob", "bob-pass").await;

    let id = alice
        .upload_file("private.txt", b"alice only".to_vec(), "")
        .await
        .unwrap();

    assert!(bob.list_files().await.unwrap().is_empty());
    let err = bob.get_file(&id).await.unwrap_err();
    assert_eq!(status(err), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_files_survive_restart_on_disk() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        database_url: format!("sqlite://{}", dir.path().join("keeper.db").display()),
        storage: StorageConfig::Fs(dir.path().join("objects")),
        ..ServerConfig::default()
    };

    let server = TestServer::start_with(config.clone()).await;
    let client = server.registered("alice", PASS).await;
    let id = client
        .upload_file("notes.txt", b"persisted".to_vec(), "")
        .await
        .unwrap();
    server.stop().await;

    let server = TestServer::start_with(config).await;
    let mut client = server.client();
    client
        .login("alice", &keeper_core::SecretString::new(PASS))
        .await
        .unwrap();
    let file = client.get_file(&id).await.unwrap();
    assert_eq!(file.bytes, b"persisted");
    assert_eq!(file.name, "notes.txt");

    server.stop().await;
}
