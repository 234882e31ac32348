//! Snapshot command - one refresh cycle.

use abaco_core::{Category, CycleOutcome, Snapshot};
use abaco_store::{AbacoClient, RefreshOutcome};
use anyhow::{Result, anyhow};
use clap::Args;
use tracing::debug;

use super::{AuthRequired, build_client, emit};
use crate::Cli;
use crate::output::CategoryOutput;

/// Arguments for the snapshot command.
#[derive(Args, Default)]
pub struct SnapshotArgs {
    /// Only show this category (e.g. accounts, cards, transactions).
    pub category: Option<Category>,
}

/// Runs one cycle and returns the committed snapshot.
///
/// An auth failure is an error; partial cycles are not.
pub async fn refresh_once(client: &AbacoClient) -> Result<std::sync::Arc<Snapshot>> {
    match client.refresh().await {
        RefreshOutcome::Committed(report) => {
            debug!(revision = report.revision, elapsed = ?report.elapsed, "Cycle done");
            if report.outcome == CycleOutcome::AuthFailed {
                return Err(anyhow!(AuthRequired));
            }
        }
        RefreshOutcome::AuthRequired => return Err(anyhow!(AuthRequired)),
        RefreshOutcome::Coalesced => {}
    }
    Ok(client.current())
}

/// Runs the snapshot command.
pub async fn run(args: &SnapshotArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli).await?;
    let snapshot = refresh_once(&client).await?;
    print_snapshot(cli, &snapshot, args.category)
}

/// Prints a snapshot (or one category of it) in the selected format.
pub fn print_snapshot(cli: &Cli, snapshot: &Snapshot, only: Option<Category>) -> Result<()> {
    let text = |f: &crate::output::TextFormatter| f.format_snapshot(snapshot, only);
    match only {
        Some(category) => emit(cli, text, &CategoryOutput::from_snapshot(snapshot, category)),
        None => emit(cli, text, snapshot),
    }
}
