//! Immutable snapshot of the latest refresh cycle.
//!
//! A [`Snapshot`] is never mutated after construction. Each cycle builds a
//! new one and the store swaps it in whole, so a reader never sees data
//! from two different cycles.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::category::Category;
use super::records::{CategorySummary, NetWorthSummary, Profile, Record};
use crate::error::{ErrorKind, SchemaError};

// ============================================================================
// Category Data
// ============================================================================

/// Everything decoded for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryData {
    /// Records that decoded successfully.
    pub records: Vec<Record>,
    /// Summary the API returned alongside the records.
    pub summary: Option<CategorySummary>,
    /// Records skipped because a required field was missing or malformed.
    pub rejected: Vec<SchemaError>,
}

impl CategoryData {
    /// Creates data from records alone.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            summary: None,
            rejected: Vec::new(),
        }
    }

    /// Attaches a summary.
    #[must_use]
    pub fn with_summary(mut self, summary: Option<CategorySummary>) -> Self {
        self.summary = summary;
        self
    }

    /// Number of decoded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records decoded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finds a record by external id.
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id().as_str() == id)
    }

    /// Appends a further page. The first page's summary wins.
    pub fn extend(&mut self, page: CategoryData) {
        self.records.extend(page.records);
        self.rejected.extend(page.rejected);
        if self.summary.is_none() {
            self.summary = page.summary;
        }
    }
}

// ============================================================================
// Category Status
// ============================================================================

/// Outcome of the most recent cycle for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CategoryStatus {
    /// Fetched and decoded this cycle.
    Ok,
    /// Failed this cycle; the last good value is retained.
    Stale {
        /// Why this cycle failed.
        reason: String,
    },
    /// Failed and no earlier value exists.
    Failed {
        /// Why this cycle failed.
        reason: String,
    },
}

impl CategoryStatus {
    /// Returns true for `Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true for `Stale`.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// Returns true for `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Stale { reason } | Self::Failed { reason } => Some(reason),
        }
    }

    /// Returns a short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Stale { .. } => "stale",
            Self::Failed { .. } => "failed",
        }
    }
}

// ============================================================================
// Category Entry
// ============================================================================

/// Status and data for one category within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    /// Status from the cycle that produced the snapshot.
    pub status: CategoryStatus,
    /// Data: fresh when `Ok`, carried over when `Stale`, absent when `Failed`.
    pub data: Option<Arc<CategoryData>>,
    /// When the data was last fetched successfully.
    pub last_success: Option<DateTime<Utc>>,
    /// Failure class for non-`Ok` entries.
    pub error_kind: Option<ErrorKind>,
}

impl CategoryEntry {
    /// A fresh entry.
    pub fn ok(data: CategoryData, fetched_at: DateTime<Utc>) -> Self {
        Self {
            status: CategoryStatus::Ok,
            data: Some(Arc::new(data)),
            last_success: Some(fetched_at),
            error_kind: None,
        }
    }

    /// A failed entry, degraded to `Stale` when `previous` holds data.
    pub fn failed(
        previous: Option<&CategoryEntry>,
        reason: impl Into<String>,
        kind: ErrorKind,
    ) -> Self {
        let reason = reason.into();
        match previous.filter(|p| p.data.is_some()) {
            Some(prev) => Self {
                status: CategoryStatus::Stale { reason },
                data: prev.data.clone(),
                last_success: prev.last_success,
                error_kind: Some(kind),
            },
            None => Self {
                status: CategoryStatus::Failed { reason },
                data: None,
                last_success: None,
                error_kind: Some(kind),
            },
        }
    }

    /// Records held by this entry (empty if none).
    pub fn records(&self) -> &[Record] {
        self.data.as_deref().map_or(&[], |d| d.records.as_slice())
    }

    /// Returns true if a value can be shown (fresh or stale).
    pub fn is_available(&self) -> bool {
        self.data.is_some()
    }
}

// ============================================================================
// Cycle Outcome
// ============================================================================

/// How the cycle that produced a snapshot ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// No cycle has completed yet.
    NeverRun,
    /// Every category succeeded.
    Complete,
    /// Some categories failed and were kept stale or marked failed.
    Partial {
        /// Categories that did not succeed.
        failed: Vec<Category>,
    },
    /// The token was rejected. Re-authentication is required.
    AuthFailed,
}

// ============================================================================
// Record View
// ============================================================================

/// A record together with the status of its category.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    /// The record.
    pub record: &'a Record,
    /// Status of the record's category.
    pub status: &'a CategoryStatus,
    /// When the record's category last succeeded.
    pub last_success: Option<DateTime<Utc>>,
}

impl RecordView<'_> {
    /// Returns true if the value is carried over from an earlier cycle.
    pub fn is_stale(&self) -> bool {
        !self.status.is_ok()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Immutable, internally consistent view of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    revision: u64,
    fetched_at: Option<DateTime<Utc>>,
    outcome: CycleOutcome,
    categories: BTreeMap<Category, CategoryEntry>,
}

impl Snapshot {
    /// The unpopulated snapshot served before the first cycle.
    pub fn empty() -> Self {
        Self {
            revision: 0,
            fetched_at: None,
            outcome: CycleOutcome::NeverRun,
            categories: BTreeMap::new(),
        }
    }

    /// Assembles a snapshot. Used by the refresh coordinator at commit time.
    pub fn new(
        revision: u64,
        fetched_at: DateTime<Utc>,
        outcome: CycleOutcome,
        categories: BTreeMap<Category, CategoryEntry>,
    ) -> Self {
        Self {
            revision,
            fetched_at: Some(fetched_at),
            outcome,
            categories,
        }
    }

    /// Monotonic revision; 0 for the empty snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// When the producing cycle committed.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// How the producing cycle ended.
    pub fn outcome(&self) -> &CycleOutcome {
        &self.outcome
    }

    /// Returns true once any cycle has committed.
    pub fn is_populated(&self) -> bool {
        self.revision > 0
    }

    /// Returns true if the producing cycle hit an auth failure.
    pub fn needs_reauth(&self) -> bool {
        self.outcome == CycleOutcome::AuthFailed
    }

    /// Entry for a category, if the category has ever been attempted.
    pub fn entry(&self, category: Category) -> Option<&CategoryEntry> {
        self.categories.get(&category)
    }

    /// All entries in category order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &CategoryEntry)> {
        self.categories.iter().map(|(c, e)| (*c, e))
    }

    /// Status of a category.
    pub fn status(&self, category: Category) -> Option<&CategoryStatus> {
        self.entry(category).map(|e| &e.status)
    }

    /// Data of a category (fresh or stale).
    pub fn data(&self, category: Category) -> Option<&CategoryData> {
        self.entry(category).and_then(|e| e.data.as_deref())
    }

    /// Records of a category (empty if none).
    pub fn records(&self, category: Category) -> &[Record] {
        self.entry(category).map_or(&[], CategoryEntry::records)
    }

    /// Looks up one record by external id.
    pub fn record(&self, category: Category, id: &str) -> Option<RecordView<'_>> {
        let entry = self.entry(category)?;
        let record = entry.data.as_deref()?.find(id)?;
        Some(RecordView {
            record,
            status: &entry.status,
            last_success: entry.last_success,
        })
    }

    /// Looks up a record by its `<category>_<id>` entity key.
    pub fn record_by_key(&self, key: &str) -> Option<RecordView<'_>> {
        Category::all().iter().find_map(|category| {
            let id = key.strip_prefix(category.as_str())?.strip_prefix('_')?;
            self.record(*category, id)
        })
    }

    /// The profile record.
    pub fn profile(&self) -> Option<&Profile> {
        match self.records(Category::Profile).first() {
            Some(Record::Profile(p)) => Some(p),
            _ => None,
        }
    }

    /// The net worth summary record.
    pub fn net_worth_summary(&self) -> Option<&NetWorthSummary> {
        match self.records(Category::NetWorthSummary).first() {
            Some(Record::NetWorthSummary(s)) => Some(s),
            _ => None,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::money::{Currency, Money};
    use crate::models::records::{Account, ExternalId};
    use rust_decimal_macros::dec;

    fn account(id: &str, balance: rust_decimal::Decimal) -> Record {
        Record::Account(Account {
            id: ExternalId::new(id),
            name: format!("Account {id}"),
            nickname: None,
            account_type: None,
            institution: None,
            balance: Money::new(balance, Currency::BRL),
        })
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert!(!snapshot.is_populated());
        assert_eq!(snapshot.outcome(), &CycleOutcome::NeverRun);
        assert!(snapshot.records(Category::Accounts).is_empty());
        assert!(snapshot.profile().is_none());
    }

    #[test]
    fn test_failed_without_previous_is_failed() {
        let entry = CategoryEntry::failed(None, "timeout", ErrorKind::Transient);
        assert!(entry.status.is_failed());
        assert!(!entry.is_available());
    }

    #[test]
    fn test_failed_with_previous_is_stale_and_keeps_data() {
        let now = Utc::now();
        let prev = CategoryEntry::ok(CategoryData::new(vec![account("1", dec!(10))]), now);
        let entry = CategoryEntry::failed(Some(&prev), "timeout", ErrorKind::Transient);

        assert!(entry.status.is_stale());
        assert_eq!(entry.status.reason(), Some("timeout"));
        assert_eq!(entry.records(), prev.records());
        assert_eq!(entry.last_success, Some(now));
        assert!(Arc::ptr_eq(
            entry.data.as_ref().unwrap(),
            prev.data.as_ref().unwrap()
        ));
    }

    #[test]
    fn test_record_lookup() {
        let now = Utc::now();
        let mut categories = BTreeMap::new();
        categories.insert(
            Category::Accounts,
            CategoryEntry::ok(
                CategoryData::new(vec![account("1", dec!(10)), account("2", dec!(20))]),
                now,
            ),
        );
        let snapshot = Snapshot::new(1, now, CycleOutcome::Complete, categories);

        let view = snapshot.record(Category::Accounts, "2").unwrap();
        assert_eq!(view.record.primary_amount().unwrap().amount, dec!(20));
        assert!(!view.is_stale());
        assert!(snapshot.record(Category::Accounts, "3").is_none());

        let by_key = snapshot.record_by_key("accounts_1").unwrap();
        assert_eq!(by_key.record.id().as_str(), "1");
        assert!(snapshot.record_by_key("cards_1").is_none());
    }

    #[test]
    fn test_extend_keeps_first_summary() {
        use crate::models::records::{AccountsSummary, CategorySummary};

        let summary = CategorySummary::Accounts(AccountsSummary {
            total_accounts: Some(2),
            ..Default::default()
        });
        let mut first = CategoryData::new(vec![account("1", dec!(1))]).with_summary(Some(summary.clone()));
        first.extend(CategoryData::new(vec![account("2", dec!(2))]));

        assert_eq!(first.len(), 2);
        assert_eq!(first.summary, Some(summary));
    }
}
