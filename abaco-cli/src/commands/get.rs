//! Get command - one record by external id.

use abaco_core::Category;
use anyhow::{Result, bail};
use clap::Args;

use super::snapshot::refresh_once;
use super::{build_client, emit};
use crate::Cli;
use crate::output::RecordOutput;

/// Arguments for the get command.
#[derive(Args)]
pub struct GetArgs {
    /// Category of the record (e.g. accounts, cards, assets).
    pub category: Category,

    /// External id as reported by the API.
    pub id: String,
}

/// Runs the get command.
pub async fn run(args: &GetArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli).await?;
    let snapshot = refresh_once(&client).await?;

    let Some(view) = snapshot.record(args.category, &args.id) else {
        match snapshot.status(args.category) {
            Some(status) if !status.is_ok() && snapshot.data(args.category).is_none() => bail!(
                "{} unavailable: {}",
                args.category,
                status.reason().unwrap_or("unknown error")
            ),
            _ => bail!("No {} record with id {:?}", args.category, args.id),
        }
    };

    emit(cli, |f| f.format_record_detail(&view), &RecordOutput::from(&view))
}
