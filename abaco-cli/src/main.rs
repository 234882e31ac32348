// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Abaco CLI - Abaco Finance data from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Check a token without storing it
//! abaco validate --token "$TOKEN"
//!
//! # Validate and store the token in the system keychain
//! abaco login
//!
//! # One refresh cycle, printed as text or JSON
//! abaco snapshot
//! abaco snapshot accounts --format json --pretty
//!
//! # A single record by category and external id
//! abaco get cards 12
//!
//! # Refresh periodically
//! abaco watch --interval 120
//!
//! # Record a transaction
//! abaco add-transaction "Padaria" 12.50 --kind expense
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{add_transaction, config, get, login, snapshot, validate, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// Abaco CLI - Abaco Finance personal finance data.
#[derive(Parser)]
#[command(name = "abaco")]
#[command(about = "Abaco Finance API client")]
#[command(long_about = r"
Abaco fetches accounts, credit cards, investments, net worth, assets and
transactions from the Abaco Finance API.

The API token is taken from --token, then ABACO_API_TOKEN, then the system
keychain (see `abaco login`). It is never written to the settings file.

Examples:
  abaco login                         # Validate and store a token
  abaco snapshot                      # Fetch everything once
  abaco snapshot transactions         # One category
  abaco get accounts 42 --format json # One record
  abaco watch                         # Refresh on the configured interval
")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// API token (overrides ABACO_API_TOKEN and the keychain).
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API base URL (overrides the settings file).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Settings file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, errors only via exit code).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Probe the API once with the configured token.
    Validate,

    /// Validate a token and store it in the system keychain.
    Login(login::LoginArgs),

    /// Remove the stored token.
    Logout,

    /// Run one refresh cycle and print the snapshot.
    #[command(visible_alias = "s")]
    Snapshot(snapshot::SnapshotArgs),

    /// Refresh periodically and print each snapshot.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Print one record by category and external id.
    Get(get::GetArgs),

    /// Create a transaction.
    AddTransaction(add_transaction::AddTransactionArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The token was rejected or is missing.
    AuthRequired = 2,
    /// The API could not be reached.
    Unavailable = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: abaco_store::LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("abaco=debug,info")
    } else {
        EnvFilter::try_from_env("ABACO_LOG").unwrap_or_else(|_| {
            // Target prefixes cover every abaco_* crate.
            EnvFilter::new(format!("abaco={level}"))
        })
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = commands::load_settings(&cli).await;
    setup_logging(cli.verbose, cli.quiet, settings.get().await.log_level);

    let result = match &cli.command {
        Commands::Validate => validate::run(&cli).await,
        Commands::Login(args) => login::run(args, &cli).await,
        Commands::Logout => login::logout(&cli).await,
        Commands::Snapshot(args) => snapshot::run(args, &cli).await,
        Commands::Watch(args) => watch::run(args, &cli).await,
        Commands::Get(args) => get::run(args, &cli).await,
        Commands::AddTransaction(args) => add_transaction::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(commands::exit_code_for(&e) as i32);
    }

    Ok(())
}
