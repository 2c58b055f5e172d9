//! keeper command-line interface.
//!
//! Every textual field is sealed locally with the account password before it
//! is sent, and opened locally after it is received. The server only ever
//! sees ciphertext.

pub mod client;
pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keeper_core::{Config, SecretString};

pub use client::{ClientError, KeeperClient, RemoteSecret};

/// keeper - client-encrypted secret storage
#[derive(Parser)]
#[command(name = "keeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "KEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server base URL
    #[arg(short, long, env = "KEEPER_SERVER")]
    pub server: Option<String>,

    /// Account login
    #[arg(short, long, env = "KEEPER_LOGIN")]
    pub login: Option<String>,

    /// Account password, also the encryption passphrase (prompted if omitted)
    #[arg(short, long, env = "KEEPER_PASSWORD", hide_env_values = true)]
    pub password: Option<SecretString>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the keeper server
    Serve(commands::serve::ServeArgs),

    /// Check that the server is reachable
    Ping,

    /// Create an account
    Register,

    /// Manage text notes
    Note(commands::secrets::NoteArgs),

    /// Manage site credentials
    Cred(commands::secrets::CredArgs),

    /// Manage payment cards
    Card(commands::secrets::CardArgs),

    /// Manage files
    File(commands::files::FileArgs),
}

/// Load the configuration named by `--config`, or the default one.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    config.validate()?;
    Ok(config)
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let context = commands::Context::new(&cli, config);
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, &context).await,
        Commands::Ping => commands::account::ping(&context).await,
        Commands::Register => commands::account::register(&context).await,
        Commands::Note(args) => commands::secrets::run_note(args, &context).await,
        Commands::Cred(args) => commands::secrets::run_cred(args, &context).await,
        Commands::Card(args) => commands::secrets::run_card(args, &context).await,
        Commands::File(args) => commands::files::run(args, &context).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_ping_with_globals() {
        let cli = Cli::try_parse_from([
            "keeper",
            "-s",
            "http://127.0.0.1:9000",
            "-l",
            "alice",
            "-p",
            "pw",
            "ping",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Ping));
        assert_eq!(cli.server.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(cli.login.as_deref(), Some("alice"));
        assert_eq!(cli.password.unwrap().expose_secret(), "pw");
    }

    #[test]
    fn test_parse_note_create() {
        let cli = Cli::try_parse_from(["keeper", "note", "create", "k", "body", "meta"]).unwrap();
        match cli.command {
            Commands::Note(args) => match args.command {
                commands::secrets::NoteCommand::Create {
                    key,
                    text,
                    metadata,
                } => {
                    assert_eq!(key, "k");
                    assert_eq!(text, "body");
                    assert_eq!(metadata, "meta");
                }
                _ => panic!("Expected Note Create command"),
            },
            _ => panic!("Expected Note command"),
        }
    }

    #[test]
    fn test_parse_cred_update() {
        let cli = Cli::try_parse_from([
            "keeper", "cred", "update", "id1", "site", "user", "secret", "meta",
        ])
        .unwrap();
        match cli.command {
            Commands::Cred(args) => match args.command {
                commands::secrets::CredCommand::Update { id, fields } => {
                    assert_eq!(id, "id1");
                    assert_eq!(fields.site, "site");
                    assert_eq!(fields.site_login, "user");
                    assert_eq!(fields.site_password, "secret");
                }
                _ => panic!("Expected Cred Update command"),
            },
            _ => panic!("Expected Cred command"),
        }
    }

    #[test]
    fn test_parse_file_get_with_out() {
        let cli =
            Cli::try_parse_from(["keeper", "file", "get", "f1", "--out", "/tmp/x"]).unwrap();
        match cli.command {
            Commands::File(args) => match args.command {
                commands::files::FileCommand::Get { id, out } => {
                    assert_eq!(id, "f1");
                    assert_eq!(out, Some(PathBuf::from("/tmp/x")));
                }
                _ => panic!("Expected File Get command"),
            },
            _ => panic!("Expected File command"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "keeper",
            "serve",
            "--address",
            "127.0.0.1:0",
            "--memory-storage",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.address.as_deref(), Some("127.0.0.1:0"));
                assert!(args.memory_storage);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_card_requires_all_fields() {
        assert!(Cli::try_parse_from(["keeper", "card", "create", "4111"]).is_err());
    }
}
