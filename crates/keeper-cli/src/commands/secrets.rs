//! Note, credential and card commands.
//!
//! Every field is sealed before it leaves the process and opened after it
//! comes back, using the account password as the passphrase.

use clap::{Args, Subcommand};
use keeper_core::{crypto, mask_card_number, CardInfo, Credentials, Note};
use serde::Serialize;

use super::Context;
use crate::client::{KeeperClient, RemoteSecret};

/// Note command arguments.
#[derive(Args)]
pub struct NoteArgs {
    #[command(subcommand)]
    pub command: NoteCommand,
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Store a new note
    Create {
        /// Title the note is listed under
        key: String,
        /// Note body
        text: String,
        /// Free-form metadata
        metadata: String,
    },

    /// List notes by key
    List,

    /// Show one note
    Get {
        /// Note id
        id: String,
    },

    /// Replace a note
    Update {
        /// Note id
        id: String,
        key: String,
        text: String,
        metadata: String,
    },

    /// Delete a note
    Delete {
        /// Note id
        id: String,
    },
}

/// Credential command arguments.
#[derive(Args)]
pub struct CredArgs {
    #[command(subcommand)]
    pub command: CredCommand,
}

/// Fields of a stored credential.
#[derive(Args)]
pub struct CredFields {
    /// Site the credential belongs to
    pub site: String,
    /// Login on that site
    #[arg(value_name = "LOGIN")]
    pub site_login: String,
    /// Password on that site
    #[arg(value_name = "PASSWORD")]
    pub site_password: String,
    /// Free-form metadata
    pub metadata: String,
}

impl From<CredFields> for Credentials {
    fn from(fields: CredFields) -> Self {
        Self {
            site: fields.site,
            login: fields.site_login,
            password: fields.site_password,
            metadata: fields.metadata,
        }
    }
}

#[derive(Subcommand)]
pub enum CredCommand {
    /// Store a new credential
    Create(CredFields),

    /// List credentials by site
    List,

    /// Show one credential
    Get {
        /// Credential id
        id: String,
    },

    /// Replace a credential
    Update {
        /// Credential id
        id: String,
        #[command(flatten)]
        fields: CredFields,
    },

    /// Delete a credential
    Delete {
        /// Credential id
        id: String,
    },
}

/// Card command arguments.
#[derive(Args)]
pub struct CardArgs {
    #[command(subcommand)]
    pub command: CardCommand,
}

#[derive(Subcommand)]
pub enum CardCommand {
    /// Store a new card
    Create {
        number: String,
        /// Expiration date, e.g. 12/29
        expiration: String,
        cvv: String,
        metadata: String,
    },

    /// List cards by masked number
    List,

    /// Show one card
    Get {
        /// Card id
        id: String,
    },

    /// Replace a card
    Update {
        /// Card id
        id: String,
        number: String,
        expiration: String,
        cvv: String,
        metadata: String,
    },

    /// Delete a card
    Delete {
        /// Card id
        id: String,
    },
}

/// Run the note command.
pub async fn run_note(args: NoteArgs, context: &Context) -> anyhow::Result<()> {
    let (client, passphrase) = context.session().await?;
    let passphrase = passphrase.expose_secret();

    match args.command {
        NoteCommand::Create {
            key,
            text,
            metadata,
        } => create(&client, passphrase, &Note { key, text, metadata }).await,
        NoteCommand::List => list::<Note>(&client, passphrase, str::to_string).await,
        NoteCommand::Get { id } => show::<Note>(&client, passphrase, &id).await,
        NoteCommand::Update {
            id,
            key,
            text,
            metadata,
        } => update(&client, passphrase, &id, &Note { key, text, metadata }).await,
        NoteCommand::Delete { id } => delete::<Note>(&client, &id).await,
    }
}

/// Run the credential command.
pub async fn run_cred(args: CredArgs, context: &Context) -> anyhow::Result<()> {
    let (client, passphrase) = context.session().await?;
    let passphrase = passphrase.expose_secret();

    match args.command {
        CredCommand::Create(fields) => {
            create(&client, passphrase, &Credentials::from(fields)).await
        }
        CredCommand::List => list::<Credentials>(&client, passphrase, str::to_string).await,
        CredCommand::Get { id } => show::<Credentials>(&client, passphrase, &id).await,
        CredCommand::Update { id, fields } => {
            update(&client, passphrase, &id, &Credentials::from(fields)).await
        }
        CredCommand::Delete { id } => delete::<Credentials>(&client, &id).await,
    }
}

/// Run the card command.
pub async fn run_card(args: CardArgs, context: &Context) -> anyhow::Result<()> {
    let (client, passphrase) = context.session().await?;
    let passphrase = passphrase.expose_secret();

    match args.command {
        CardCommand::Create {
            number,
            expiration,
            cvv,
            metadata,
        } => {
            let card = CardInfo {
                id: None,
                number,
                expiration,
                cvv,
                metadata,
            };
            create(&client, passphrase, &card).await
        }
        CardCommand::List => list::<CardInfo>(&client, passphrase, mask_card_number).await,
        CardCommand::Get { id } => show::<CardInfo>(&client, passphrase, &id).await,
        CardCommand::Update {
            id,
            number,
            expiration,
            cvv,
            metadata,
        } => {
            let card = CardInfo {
                id: None,
                number,
                expiration,
                cvv,
                metadata,
            };
            update(&client, passphrase, &id, &card).await
        }
        CardCommand::Delete { id } => delete::<CardInfo>(&client, &id).await,
    }
}

async fn create<T: RemoteSecret>(
    client: &KeeperClient,
    passphrase: &str,
    record: &T,
) -> anyhow::Result<()> {
    let sealed = record.seal(passphrase)?;
    let id = client.create_secret(&sealed).await?;
    println!("Created {} {}", T::ONE, id);
    Ok(())
}

/// Print `id  key` for every record, opening the listed field and passing it
/// through `display`.
async fn list<T: RemoteSecret>(
    client: &KeeperClient,
    passphrase: &str,
    display: impl Fn(&str) -> String,
) -> anyhow::Result<()> {
    let keys = client.list_secrets::<T>().await?;
    if keys.is_empty() {
        println!("Nothing stored.");
        return Ok(());
    }

    println!("{:<38} KEY", "ID");
    for listing in &keys {
        let key = crypto::open(passphrase, &listing.key)?;
        println!("{:<38} {}", listing.id, display(&key));
    }
    Ok(())
}

async fn show<T: RemoteSecret + Serialize>(
    client: &KeeperClient,
    passphrase: &str,
    id: &str,
) -> anyhow::Result<()> {
    let sealed: T = client.get_secret(id).await?;
    let record = sealed.open(passphrase)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn update<T: RemoteSecret>(
    client: &KeeperClient,
    passphrase: &str,
    id: &str,
    record: &T,
) -> anyhow::Result<()> {
    let sealed = record.seal(passphrase)?;
    client.update_secret(id, &sealed).await?;
    println!("Updated {} {}", T::ONE, id);
    Ok(())
}

async fn delete<T: RemoteSecret>(client: &KeeperClient, id: &str) -> anyhow::Result<()> {
    client.delete_secret::<T>(id).await?;
    println!("Deleted {} {}", T::ONE, id);
    Ok(())
}
