//! Watch command - periodic refresh cycles.

use std::io::{Write, stdout};

use abaco_core::Snapshot;
use abaco_store::Settings;
use anyhow::{Result, anyhow};
use clap::Args;
use tracing::info;

use super::snapshot::print_snapshot;
use super::{AuthRequired, client_for, effective_settings};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval).
    #[arg(long, short)]
    pub interval: Option<u64>,
}

/// Runs the watch command until Ctrl+C or an auth failure.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let mut settings = effective_settings(cli).await?;
    if let Some(interval) = args.interval {
        settings.set("refresh_interval_secs", &interval.to_string())?;
    }
    let client = client_for(cli, &settings)?;

    info!(interval_secs = settings.refresh_interval().as_secs(), "Starting watch mode");

    let mut snapshots = client.subscribe();
    let handle = client.start();

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Err(e) = render(cli, &snapshot, &settings) {
                    break Err(e);
                }

                if snapshot.needs_reauth() {
                    break Err(anyhow!(AuthRequired));
                }
            }
        }
    };

    handle.shutdown().await;
    result
}

fn render(cli: &Cli, snapshot: &Snapshot, settings: &Settings) -> Result<()> {
    if cli.format == OutputFormat::Text {
        // Clear screen
        print!("\x1b[2J\x1b[H");
        stdout().flush()?;
    }
    print_snapshot(cli, snapshot, None)?;
    if cli.format == OutputFormat::Text {
        println!();
        println!(
            "Refreshing every {}s. Press Ctrl+C to exit",
            settings.refresh_interval().as_secs()
        );
    }
    Ok(())
}
