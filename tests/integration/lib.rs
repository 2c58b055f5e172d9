//! Helpers shared by the end-to-end tests.

use keeper_cli::KeeperClient;
use keeper_core::SecretString;
use keeper_server::{Server, ServerConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A server listening on an ephemeral local port.
pub struct TestServer {
    pub url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<keeper_server::Result<()>>,
}

impl TestServer {
    /// Start a server with in-memory database and file storage.
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    /// Start a server with `config`; its address is ignored.
    pub async fn start_with(config: ServerConfig) -> Self {
        let server = Server::new(config).await.expect("server should start");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(listener, async {
            let _ = rx.await;
        }));

        Self {
            url,
            shutdown: Some(tx),
            handle,
        }
    }

    /// A client for this server with no session.
    pub fn client(&self) -> KeeperClient {
        KeeperClient::new(self.url.clone())
    }

    /// Register `login` and return a client holding its session.
    pub async fn registered(&self, login: &str, password: &str) -> KeeperClient {
        let mut client = self.client();
        client
            .register(login, &SecretString::new(password))
            .await
            .expect("register should succeed");
        client
    }

    /// Stop the server and wait for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let result = (&mut self.handle).await.expect("server task panicked");
        result.expect("server should stop cleanly");
    }
}
