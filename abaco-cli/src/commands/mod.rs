//! CLI command implementations.

pub mod add_transaction;
pub mod config;
pub mod get;
pub mod login;
pub mod snapshot;
pub mod validate;
pub mod watch;

use abaco_fetch::FetchError;
use abaco_store::{
    AbacoClient, Settings, SettingsStore, StoreError, default_settings_path, resolve_token,
};
use anyhow::{Context, Result};
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

// ============================================================================
// Shared setup
// ============================================================================

/// Loads the settings store from `--config` or the default location.
pub async fn load_settings(cli: &Cli) -> SettingsStore {
    let path = cli.config.clone().unwrap_or_else(default_settings_path);
    SettingsStore::load(path).await
}

/// Effective settings: the file, with `--base-url` applied on top.
pub async fn effective_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = load_settings(cli).await.get().await;
    if let Some(base_url) = &cli.base_url {
        settings.set("base_url", base_url)?;
    }
    Ok(settings)
}

/// Builds a client from effective settings and the resolved token.
pub async fn build_client(cli: &Cli) -> Result<AbacoClient> {
    let settings = effective_settings(cli).await?;
    client_for(cli, &settings)
}

/// Builds a client for the given settings.
pub fn client_for(cli: &Cli, settings: &Settings) -> Result<AbacoClient> {
    let (token, source) = resolve_token(cli.token.as_deref(), &settings.base_url)?;
    debug!(%source, base_url = %settings.base_url, "Using API token");
    AbacoClient::new(settings.credential(token)?, settings).context("Failed to build client")
}

/// Formatters for the selected output mode.
pub fn formatters(cli: &Cli) -> (TextFormatter, JsonFormatter) {
    (
        TextFormatter::new(!cli.no_color),
        JsonFormatter::new(cli.pretty),
    )
}

/// Prints either the text rendering or the JSON value.
pub fn emit<T: serde::Serialize>(
    cli: &Cli,
    text: impl FnOnce(&TextFormatter) -> String,
    json: &T,
) -> Result<()> {
    let (text_formatter, json_formatter) = formatters(cli);
    match cli.format {
        OutputFormat::Text => println!("{}", text(&text_formatter)),
        OutputFormat::Json => println!("{}", json_formatter.format(json)?),
    }
    Ok(())
}

// ============================================================================
// Errors & exit codes
// ============================================================================

/// The API rejected the token during a refresh.
#[derive(Debug, thiserror::Error)]
#[error("the API token was rejected; run `abaco login` with a new token")]
pub struct AuthRequired;

/// Maps an error chain onto an exit code.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if cause.is::<AuthRequired>() {
            return ExitCode::AuthRequired;
        }
        if let Some(store) = cause.downcast_ref::<StoreError>() {
            if store.needs_reauth() {
                return ExitCode::AuthRequired;
            }
            if store.is_transient() {
                return ExitCode::Unavailable;
            }
        }
        if let Some(fetch) = cause.downcast_ref::<FetchError>() {
            if fetch.is_auth() {
                return ExitCode::AuthRequired;
            }
            if fetch.is_retryable() {
                return ExitCode::Unavailable;
            }
        }
    }
    ExitCode::Error
}
