//! HTTP server.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use keeper_core::config::StorageBackend;
use keeper_core::{CardInfo, Config, Credentials, KeeperError, Note};
use keeper_files::{
    DefaultFileService, FileServiceConfig, FsObjectStorage, MemoryObjectStorage, ObjectStorage,
};
use keeper_store::Store;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers::{self, files, secrets, users};
use crate::state::AppState;
use crate::Result;

/// Default listen address.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";

/// Where file content is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// One directory per owner under this root.
    Fs(PathBuf),
    /// In memory, lost on shutdown.
    Memory,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub address: String,

    /// SQLite connection URL.
    pub database_url: String,

    /// Maximum request body size.
    pub body_limit_bytes: usize,

    /// Session token lifetime.
    pub token_ttl: Duration,

    /// File content backend.
    pub storage: StorageConfig,

    /// File service timeouts.
    pub files: FileServiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            database_url: "sqlite::memory:".to_string(),
            body_limit_bytes: 32 * 1024 * 1024,
            token_ttl: Duration::from_secs(24 * 60 * 60),
            storage: StorageConfig::Memory,
            files: FileServiceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Resolve the server settings of a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(KeeperError::from)?;

        let storage = match config.storage.backend {
            StorageBackend::Fs => {
                StorageConfig::Fs(config.storage_root().map_err(KeeperError::from)?)
            }
            StorageBackend::Memory => StorageConfig::Memory,
        };

        Ok(Self {
            address: config.server.address.clone(),
            database_url: config.database_url().map_err(KeeperError::from)?,
            body_limit_bytes: config.server.body_limit_bytes,
            token_ttl: Duration::from_secs(config.server.token_ttl_secs),
            storage,
            files: FileServiceConfig::from(&config.storage),
        })
    }
}

/// Create the parent directory of a file-backed SQLite database.
fn prepare_database_dir(url: &str) -> Result<()> {
    if url.contains(":memory:") {
        return Ok(());
    }
    let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// The keeper HTTP server.
pub struct Server {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl Server {
    /// Open the database and file storage described by `config`.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        prepare_database_dir(&config.database_url)?;
        let store = Store::open(&config.database_url, config.token_ttl).await?;

        let purged = store.sessions.purge_expired().await?;
        if purged > 0 {
            info!("Purged {} expired sessions", purged);
        }

        let storage: Arc<dyn ObjectStorage> = match &config.storage {
            StorageConfig::Fs(root) => {
                info!("Storing files under {}", root.display());
                Arc::new(FsObjectStorage::new(root.clone()))
            }
            StorageConfig::Memory => {
                warn!("Using in-memory file storage; files are lost on shutdown");
                Arc::new(MemoryObjectStorage::new())
            }
        };
        let files = Arc::new(DefaultFileService::new(storage, config.files));

        Ok(Self {
            state: Arc::new(AppState::new(store, files)),
            config,
        })
    }

    /// Shared handler state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Create the Axum router.
    pub fn router(&self) -> Router {
        let user_routes = Router::new()
            .route("/register", post(users::register))
            .route("/login", post(users::login));

        let secret_routes = secrets::routes::<Note>("text", "texts")
            .merge(secrets::routes::<Credentials>("cred", "creds"))
            .merge(secrets::routes::<CardInfo>("card", "cards"))
            .merge(files::routes());

        Router::new()
            .route("/ping", get(handlers::ping))
            .nest("/api/user", user_routes)
            .nest("/api/secret", secret_routes)
            .layer(DefaultBodyLimit::max(self.config.body_limit_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.address).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!("Starting keeper server on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
