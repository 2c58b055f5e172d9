//! End-to-end secret storage tests.
//!
//! A real server on a local port, driven through `KeeperClient` with every
//! field sealed on the client side.

use keeper_cli::{ClientError, KeeperClient};
use keeper_core::{crypto, CardInfo, Credentials, Note, SecretFields, SecretString};
use keeper_integration_tests::TestServer;

const PASS: &str = "pw123";

fn status(err: ClientError) -> u16 {
    err.status().map(|s| s.as_u16()).unwrap_or(0)
}

#[tokio::test]
async fn test_register_then_login() {
    let server = TestServer::start().await;
    server.registered("alice", PASS).await;

    let mut client = server.client();
    assert!(!client.is_authenticated());
    client
        .login("alice", &SecretString::new(PASS))
        .await
        .unwrap();
    assert!(client.is_authenticated());

    let mut other = server.client();
    let err = other
        .login("alice", &SecretString::new("wrong"))
        .await
        .unwrap_err();
    assert_eq!(status(err), 401);

    let err = other
        .login("nobody", &SecretString::new(PASS))
        .await
        .unwrap_err();
    assert_eq!(status(err), 401);

    server.stop().await;
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = TestServer::start().await;
    server.registered("alice", PASS).await;

    let mut client = server.client();
    let err = client
        .register("alice", &SecretString::new("other"))
        .await
        .unwrap_err();
    assert_eq!(status(err), 409);

    server.stop().await;
}

#[tokio::test]
async fn test_sealed_note_lifecycle() {
    let server = TestServer::start().await;
    let client = server.registered("alice", PASS).await;

    let note = Note {
        key: "groceries".into(),
        text: "milk, eggs".into(),
        metadata: "home".into(),
    };
    let sealed = note.seal(PASS).unwrap();
    let id = client.create_secret(&sealed).await.unwrap();

    // The server hands back exactly what it was given
    let stored: Note = client.get_secret(&id).await.unwrap();
    assert_eq!(stored, sealed);
    assert_eq!(stored.open(PASS).unwrap(), note);

    let keys = client.list_secrets::<Note>().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].id, id);
    assert_eq!(crypto::open(PASS, &keys[0].key).unwrap(), "groceries");

    let changed = Note {
        text: "milk, eggs, bread".into(),
        ..note.clone()
    };
    client
        .update_secret(&id, &changed.seal(PASS).unwrap())
        .await
        .unwrap();
    let stored: Note = client.get_secret(&id).await.unwrap();
    assert_eq!(stored.open(PASS).unwrap().text, "milk, eggs, bread");

    client.delete_secret::<Note>(&id).await.unwrap();
    let err = client.get_secret::<Note>(&id).await.unwrap_err();
    assert_eq!(status(err), 404);
    let err = client.delete_secret::<Note>(&id).await.unwrap_err();
    assert_eq!(status(err), 404);

    server.stop().await;
}

#[tokio::test]
async fn test_sealed_credentials_lifecycle() {
    let server = TestServer::start().await;
    let client = server.registered("alice", PASS).await;

    let creds = Credentials {
        site: "example.com".into(),
        login: "alice@example.com".into(),
        password: "hunter2".into(),
        metadata: String::new(),
    };
    let id = client
        .create_secret(&creds.seal(PASS).unwrap())
        .await
        .unwrap();

    let stored: Credentials = client.get_secret(&id).await.unwrap();
    assert_ne!(stored.password, "hunter2");
    assert_eq!(stored.open(PASS).unwrap(), creds);

    let keys = client.list_secrets::<Credentials>().await.unwrap();
    assert_eq!(crypto::open(PASS, &keys[0].key).unwrap(), "example.com");

    server.stop().await;
}

#[tokio::test]
async fn test_card_is_stored_with_pinned_ciphertext() {
    let server = TestServer::start().await;
    let client = server.registered("alice", PASS).await;

    let card = CardInfo {
        id: None,
        number: "4111111111111111".into(),
        expiration: "12/29".into(),
        cvv: "123".into(),
        metadata: String::new(),
    };
    let id = client.create_secret(&card.seal(PASS).unwrap()).await.unwrap();

    let stored: CardInfo = client.get_secret(&id).await.unwrap();
    assert_eq!(
        stored.number,
        "274f550003255058a7dee69115b80b62af54aa7d76ede7026c666063b97ca587"
    );

    let keys = client.list_secrets::<CardInfo>().await.unwrap();
    assert_eq!(keys[0].key, stored.number);
    assert_eq!(stored.open(PASS).unwrap().number, "4111111111111111");

    // Another passphrase cannot open it
    let err = stored.open("not-the-password").unwrap_err();
    assert_eq!(err.kind(), keeper_core::ErrorKind::Authentication);

    server.stop().await;
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let server = TestServer::start().await;
    let alice = server.registered("alice", PASS).await;
    let bob = server.registered("bob", "bob-pass").await;

    let note = Note {
        key: "k".into(),
        text: "t".into(),
        metadata: "m".into(),
    };
    let id = alice.create_secret(&note.seal(PASS).unwrap()).await.unwrap();

    let err = bob.get_secret::<Note>(&id).await.unwrap_err();
    assert_eq!(status(err), 404);
    let err = bob.delete_secret::<Note>(&id).await.unwrap_err();
    assert_eq!(status(err), 404);
    assert!(bob.list_secrets::<Note>().await.unwrap().is_empty());

    // Still there for its owner
    alice.get_secret::<Note>(&id).await.unwrap();

    server.stop().await;
}

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
    let server = TestServer::start().await;
    let anonymous = KeeperClient::new(server.url.clone());

    server.client().ping().await.unwrap();

    // The client refuses to send secret requests without a token
    let err = anonymous.list_secrets::<Note>().await.unwrap_err();
    assert!(matches!(err, ClientError::Keeper(_)));

    server.stop().await;
}
