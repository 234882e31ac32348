//! Login and logout - manage the token stored in the keychain.

use std::io::{BufRead, Write};
use std::sync::Arc;

use abaco_core::Credential;
use abaco_store::{TOKEN_ENV_VAR, keychain};
use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use super::{effective_settings, formatters};
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Read the token from standard input instead of prompting.
    #[arg(long)]
    pub stdin: bool,
}

/// Validates a token and stores it in the keychain for the base URL.
///
/// The token is stored only after the API accepts it.
pub async fn run(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let settings = effective_settings(cli).await?;
    let token = match cli.token.clone().or_else(|| std::env::var(TOKEN_ENV_VAR).ok()) {
        Some(token) if !token.trim().is_empty() => token,
        _ => read_token(args.stdin)?,
    };

    let credential = Arc::new(settings.credential(token.trim())?);
    abaco_fetch::validate_with(
        Arc::clone(&credential),
        settings.transport_config(),
        &settings.profile_probe(),
    )
        .await
        .context("The API did not accept the token; nothing was stored")?;

    store(&credential)?;
    info!(base_url = credential.base_str(), "Token stored");

    let (text, json) = formatters(cli);
    match cli.format {
        OutputFormat::Text => println!(
            "Token accepted and stored for {}",
            text.cyan(credential.base_str())
        ),
        OutputFormat::Json => println!(
            "{}",
            json.format(&serde_json::json!({"stored": true, "base_url": credential.base_str()}))?
        ),
    }
    Ok(())
}

fn store(credential: &Credential) -> Result<()> {
    keychain::store_token(credential.base_str(), credential.expose_token())?;
    Ok(())
}

fn read_token(from_stdin: bool) -> Result<String> {
    if !from_stdin {
        eprint!("API token: ");
        std::io::stderr().flush()?;
    }
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let token = line.trim().to_string();
    if token.is_empty() {
        bail!("No token given");
    }
    Ok(token)
}

/// Removes the stored token for the base URL.
pub async fn logout(cli: &Cli) -> Result<()> {
    let settings = effective_settings(cli).await?;
    keychain::delete_token(&settings.base_url)?;
    info!(base_url = %settings.base_url, "Token removed");

    match cli.format {
        OutputFormat::Text => println!("Token removed for {}", settings.base_url),
        OutputFormat::Json => println!(
            "{}",
            formatters(cli)
                .1
                .format(&serde_json::json!({"removed": true, "base_url": settings.base_url}))?
        ),
    }
    Ok(())
}
