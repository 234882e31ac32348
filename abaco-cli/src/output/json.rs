//! JSON output formatting.

use abaco_core::{
    Category, CategoryEntry, CategoryStatus, CycleOutcome, ErrorKind, Record, RecordView, Snapshot,
};
use abaco_fetch::ProbeResult;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// One category of a snapshot, with the snapshot's metadata.
#[derive(Debug, Serialize)]
pub struct CategoryOutput<'a> {
    pub revision: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub outcome: &'a CycleOutcome,
    pub category: Category,
    #[serde(flatten)]
    pub entry: &'a CategoryEntry,
}

impl<'a> CategoryOutput<'a> {
    /// Extracts `category` from a snapshot, if it was part of the cycle.
    pub fn from_snapshot(snapshot: &'a Snapshot, category: Category) -> Option<Self> {
        snapshot.entry(category).map(|entry| Self {
            revision: snapshot.revision(),
            fetched_at: snapshot.fetched_at(),
            outcome: snapshot.outcome(),
            category,
            entry,
        })
    }
}

/// One record with the state of its category.
#[derive(Debug, Serialize)]
pub struct RecordOutput<'a> {
    pub entity_key: String,
    pub category: Category,
    pub stale: bool,
    pub status: &'a CategoryStatus,
    pub last_success: Option<DateTime<Utc>>,
    pub record: &'a Record,
}

impl<'a> From<&RecordView<'a>> for RecordOutput<'a> {
    fn from(view: &RecordView<'a>) -> Self {
        Self {
            entity_key: view.record.entity_key(),
            category: view.record.category(),
            stale: view.is_stale(),
            status: view.status,
            last_success: view.last_success,
            record: view.record,
        }
    }
}

/// Result of a connectivity probe.
#[derive(Debug, Serialize)]
pub struct ProbeOutput {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ProbeResult> for ProbeOutput {
    fn from(result: &ProbeResult) -> Self {
        Self {
            ok: result.is_success(),
            kind: result.kind(),
            response_time_ms: result.response_time_ms(),
            error: result.outcome.as_ref().err().map(ToString::to_string),
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
