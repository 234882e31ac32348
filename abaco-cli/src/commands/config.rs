//! Config command - manage configuration.

use abaco_store::{default_config_dir, keychain};
use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use super::{emit, load_settings};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Set one value, e.g. `refresh_interval_secs 600` or
    /// `endpoint.net_worth_items /api/v2/patrimony`.
    Set {
        /// Setting name.
        key: String,
        /// New value (empty removes an endpoint override).
        value: String,
    },

    /// Show configuration paths.
    Path,

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Set { key, value } => set_value(key, value, cli).await,
        ConfigAction::Path => show_paths(cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    let settings = store.get().await;
    emit(cli, |f| f.format_settings(&settings, store.path()), &settings)
}

async fn set_value(key: &str, value: &str, cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    store.update(|s| s.set(key, value)).await?;
    store.save().await?;

    info!(key, "Setting updated");
    if cli.format == OutputFormat::Text {
        println!("{key} updated");
    }
    Ok(())
}

async fn show_paths(cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    let settings = store.get().await;
    let token_stored = keychain::load_token(&settings.base_url)
        .map(|t| t.is_some())
        .unwrap_or(false);

    let paths = serde_json::json!({
        "config_dir": default_config_dir().display().to_string(),
        "settings_file": store.path().display().to_string(),
        "token_in_keychain": token_stored,
    });
    emit(
        cli,
        |_| {
            format!(
                "Config dir:        {}\nSettings file:     {}\nToken in keychain: {}",
                default_config_dir().display(),
                store.path().display(),
                if token_stored { "yes" } else { "no" }
            )
        },
        &paths,
    )
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    store.reset().await;
    store.save().await?;

    info!("Configuration reset to defaults");
    if cli.format == OutputFormat::Text {
        println!("Configuration reset to defaults");
    }
    Ok(())
}
