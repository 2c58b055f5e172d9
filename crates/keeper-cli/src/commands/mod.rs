//! CLI command implementations.

pub mod account;
pub mod files;
pub mod secrets;
pub mod serve;

use keeper_core::{Config, SecretString};

use crate::client::KeeperClient;
use crate::Cli;

/// Server URL used when neither flags nor config name one.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Settings resolved from flags, environment and config file.
pub struct Context {
    pub config: Config,
    pub server_url: String,
    pub login: Option<String>,
    password: Option<SecretString>,
}

impl Context {
    /// Flags and environment win over the config file.
    pub fn new(cli: &Cli, config: Config) -> Self {
        let server_url = cli
            .server
            .clone()
            .or_else(|| config.client.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let login = cli.login.clone().or_else(|| config.client.login.clone());

        Self {
            config,
            server_url,
            login,
            password: cli.password.clone(),
        }
    }

    /// An unauthenticated client.
    pub fn client(&self) -> KeeperClient {
        KeeperClient::new(self.server_url.clone())
    }

    /// The account login, which every account command needs.
    pub fn require_login(&self) -> anyhow::Result<&str> {
        self.login
            .as_deref()
            .filter(|login| !login.is_empty())
            .ok_or_else(|| anyhow::anyhow!("No login given; pass --login or set KEEPER_LOGIN"))
    }

    /// The account password, prompting for hidden input when not given.
    pub fn password(&self) -> anyhow::Result<SecretString> {
        let password = match &self.password {
            Some(password) => password.clone(),
            None => rpassword::prompt_password("Password: ")
                .map(SecretString::new)
                .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?,
        };
        if password.is_empty() {
            anyhow::bail!("Password must not be empty");
        }
        Ok(password)
    }

    /// Log in, returning the client and the passphrase for sealing.
    pub async fn session(&self) -> anyhow::Result<(KeeperClient, SecretString)> {
        let login = self.require_login()?;
        let password = self.password()?;
        let mut client = self.client();
        client
            .login(login, &password)
            .await
            .map_err(|e| anyhow::anyhow!("Login failed: {}", e))?;
        Ok((client, password))
    }
}
