//! Connectivity and account commands.

use super::Context;

/// Check that the server answers.
pub async fn ping(context: &Context) -> anyhow::Result<()> {
    context
        .client()
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("Server at {} is unreachable: {}", context.server_url, e))?;
    println!("Server at {} is up.", context.server_url);
    Ok(())
}

/// Register the account named by `--login`.
pub async fn register(context: &Context) -> anyhow::Result<()> {
    let login = context.require_login()?;
    let password = context.password()?;

    let mut client = context.client();
    client
        .register(login, &password)
        .await
        .map_err(|e| anyhow::anyhow!("Registration failed: {}", e))?;

    println!("Account '{}' registered.", login);
    Ok(())
}
