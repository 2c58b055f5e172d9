//! File commands.
//!
//! File content travels as-is; only the metadata is sealed.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use keeper_core::crypto;

use super::Context;

/// File command arguments.
#[derive(Args)]
pub struct FileArgs {
    #[command(subcommand)]
    pub command: FileCommand,
}

#[derive(Subcommand)]
pub enum FileCommand {
    /// Upload a file
    Upload {
        /// Path of the file to upload
        path: PathBuf,
        /// Free-form metadata
        metadata: String,
    },

    /// List stored files
    List,

    /// Download a file
    Get {
        /// File id
        id: String,
        /// Directory to write the file into (defaults to the current one)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete a file
    Delete {
        /// File id
        id: String,
    },
}

/// Run the file command.
pub async fn run(args: FileArgs, context: &Context) -> anyhow::Result<()> {
    let (client, passphrase) = context.session().await?;
    let passphrase = passphrase.expose_secret();

    match args.command {
        FileCommand::Upload { path, metadata } => {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))?
                .to_string();
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;

            let sealed = crypto::seal(passphrase, &metadata)?;
            let id = client.upload_file(&name, bytes, &sealed).await?;
            println!("Created file {}", id);
        }

        FileCommand::List => {
            let files = client.list_files().await?;
            if files.is_empty() {
                println!("Nothing stored.");
            } else {
                println!("{:<38} NAME", "ID");
                for file in &files {
                    println!("{:<38} {}", file.id, file.key);
                }
            }
        }

        FileCommand::Get { id, out } => {
            let file = client.get_file(&id).await?;
            let metadata = if file.metadata.is_empty() {
                String::new()
            } else {
                crypto::open(passphrase, &file.metadata)?
            };

            let dir = out.unwrap_or_else(|| PathBuf::from("."));
            tokio::fs::create_dir_all(&dir).await?;
            // Never let a server-supplied name escape the target directory
            let name = PathBuf::from(&file.name)
                .file_name()
                .map(|name| name.to_owned())
                .unwrap_or_else(|| id.clone().into());
            let target = dir.join(name);
            tokio::fs::write(&target, &file.bytes).await?;

            println!("Saved {} ({} bytes) to {}", file.name, file.size, target.display());
            println!("Metadata: {}", metadata);
        }

        FileCommand::Delete { id } => {
            client.delete_file(&id).await?;
            println!("Deleted file {}", id);
        }
    }

    Ok(())
}
