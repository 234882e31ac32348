//! Validate command - one probe request with the configured token.

use anyhow::Result;
use tracing::info;

use super::{build_client, emit};
use crate::Cli;
use crate::output::ProbeOutput;

/// Runs the validate command.
pub async fn run(cli: &Cli) -> Result<()> {
    let client = build_client(cli).await?;
    let result = client.health_check().await;

    emit(cli, |f| f.format_probe(&result), &ProbeOutput::from(&result))?;

    let elapsed_ms = result.response_time_ms();
    result.outcome?;
    info!(elapsed_ms, "Credential valid");
    Ok(())
}
