//! Serve command.

use std::path::PathBuf;

use clap::Args;
use keeper_server::{Server, ServerConfig, StorageConfig};
use tracing::info;

use super::Context;

/// Serve command arguments.
#[derive(Args)]
pub struct ServeArgs {
    /// Listen address, host:port
    #[arg(short, long, env = "KEEPER_ADDRESS")]
    pub address: Option<String>,

    /// SQLite database URL
    #[arg(long, env = "KEEPER_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory holding uploaded files
    #[arg(long, env = "KEEPER_STORAGE_DIR", conflicts_with = "memory_storage")]
    pub storage_dir: Option<PathBuf>,

    /// Keep uploaded files in memory only
    #[arg(long)]
    pub memory_storage: bool,
}

/// Apply command-line overrides on top of the config file.
pub fn server_config(args: ServeArgs, context: &Context) -> anyhow::Result<ServerConfig> {
    let mut config = ServerConfig::from_config(&context.config)?;

    if let Some(address) = args.address {
        config.address = address;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(dir) = args.storage_dir {
        config.storage = StorageConfig::Fs(dir);
    }
    if args.memory_storage {
        config.storage = StorageConfig::Memory;
    }
    Ok(config)
}

/// Run the server until interrupted.
pub async fn run(args: ServeArgs, context: &Context) -> anyhow::Result<()> {
    let config = server_config(args, context)?;
    info!(
        "Starting keeper server on {} (database: {})",
        config.address, config.database_url
    );

    let server = Server::new(config).await?;
    server.run().await?;
    Ok(())
}
