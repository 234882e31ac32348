//! Refresh coordinator.
//!
//! Runs refresh cycles: fetch every category, merge the results with the
//! previous snapshot, and publish the result. At most one cycle is in
//! flight; triggers that arrive meanwhile are coalesced.

use std::collections::BTreeMap;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use abaco_core::{
    Category, CategoryData, CategoryEntry, CycleOutcome, ErrorKind, Snapshot,
};
use abaco_endpoints::CategoryFetcher;
use abaco_fetch::FetchError;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::snapshot_store::SnapshotStore;

/// Reason recorded for categories cut off by the cycle deadline.
pub const DEADLINE_REASON: &str = "refresh deadline exceeded";

/// Reason recorded for categories skipped after an auth failure.
pub const AUTH_SKIPPED_REASON: &str = "skipped: authentication failed";

// ============================================================================
// Config & Results
// ============================================================================

/// Cycle tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Overall deadline for one cycle.
    pub deadline: Duration,
    /// Category fetches in flight at once.
    pub max_concurrency: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(30),
            max_concurrency: 4,
        }
    }
}

/// Summary of one committed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Revision of the published snapshot.
    pub revision: u64,
    /// How the cycle ended.
    pub outcome: CycleOutcome,
    /// Wall time spent.
    pub elapsed: Duration,
}

/// What a refresh trigger did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A cycle ran and its snapshot was published.
    Committed(CycleReport),
    /// Another cycle was already running; nothing was fetched.
    Coalesced,
    /// An earlier cycle hit an auth failure; nothing was fetched.
    AuthRequired,
}

impl RefreshOutcome {
    /// The report, if a cycle ran.
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Committed(report) => Some(report),
            _ => None,
        }
    }
}

// ============================================================================
// In-flight guard
// ============================================================================

/// Holds the in-flight flag for the life of one cycle, including when the
/// cycle future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Drives refresh cycles and owns publishing to the [`SnapshotStore`].
#[derive(Debug)]
pub struct RefreshCoordinator {
    fetcher: CategoryFetcher,
    store: SnapshotStore,
    config: RefreshConfig,
    in_flight: AtomicBool,
    auth_failed: AtomicBool,
}

impl RefreshCoordinator {
    /// Creates a coordinator publishing into `store`.
    pub fn new(fetcher: CategoryFetcher, store: SnapshotStore, config: RefreshConfig) -> Self {
        Self {
            fetcher,
            store,
            config,
            in_flight: AtomicBool::new(false),
            auth_failed: AtomicBool::new(false),
        }
    }

    /// The store this coordinator publishes into.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// The category fetcher.
    pub fn fetcher(&self) -> &CategoryFetcher {
        &self.fetcher
    }

    /// Returns true while a cycle is running.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Returns true once a cycle has ended `AuthFailed`.
    pub fn needs_reauth(&self) -> bool {
        self.auth_failed.load(Ordering::Acquire)
    }

    /// Runs one cycle unless one is already running or the token has been
    /// rejected.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.needs_reauth() {
            debug!("Refresh skipped, re-authentication required");
            return RefreshOutcome::AuthRequired;
        }
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("Refresh coalesced into the running cycle");
            return RefreshOutcome::Coalesced;
        };

        RefreshOutcome::Committed(self.run_cycle().await)
    }

    async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.deadline;
        let (mut results, auth_hit) = self.fetch_all(deadline).await;

        let previous = self.store.current();
        let fetched_at = Utc::now();
        let mut categories = BTreeMap::new();
        let mut failed = Vec::new();

        for &category in Category::all() {
            let prev = previous.entry(category);
            let entry = match results.remove(&category) {
                Some(Ok(data)) => CategoryEntry::ok(data, fetched_at),
                Some(Err(err)) => {
                    warn!(%category, kind = %err.kind(), error = %err, "Category failed");
                    CategoryEntry::failed(prev, err.to_string(), err.kind())
                }
                None if auth_hit => CategoryEntry::failed(prev, AUTH_SKIPPED_REASON, ErrorKind::Auth),
                None => {
                    warn!(%category, "Category cut off by cycle deadline");
                    CategoryEntry::failed(prev, DEADLINE_REASON, ErrorKind::Transient)
                }
            };
            if !entry.status.is_ok() {
                failed.push(category);
            }
            categories.insert(category, entry);
        }

        let outcome = if auth_hit {
            self.auth_failed.store(true, Ordering::Release);
            CycleOutcome::AuthFailed
        } else if failed.is_empty() {
            CycleOutcome::Complete
        } else {
            CycleOutcome::Partial { failed }
        };

        let revision = previous.revision() + 1;
        self.store.publish(Snapshot::new(
            revision,
            fetched_at,
            outcome.clone(),
            categories,
        ));

        let elapsed = started.elapsed();
        match &outcome {
            CycleOutcome::AuthFailed => {
                warn!(revision, "Token rejected, refresh halted until re-authentication");
            }
            _ => info!(
                revision,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                ?outcome,
                "Refresh cycle committed"
            ),
        }

        CycleReport {
            revision,
            outcome,
            elapsed,
        }
    }

    /// Fetches categories concurrently, profile first, until all finish,
    /// one fails on auth, or the deadline passes. Dropping the stream
    /// abandons whatever is still in flight.
    async fn fetch_all(
        &self,
        deadline: tokio::time::Instant,
    ) -> (BTreeMap<Category, Result<CategoryData, FetchError>>, bool) {
        let mut results = BTreeMap::new();
        let mut fetches = pin!(
            stream::iter(Category::all().iter().copied())
                .map(|category| async move { (category, self.fetcher.fetch(category).await) })
                .buffer_unordered(self.config.max_concurrency.max(1))
        );

        loop {
            match tokio::time::timeout_at(deadline, fetches.next()).await {
                Ok(Some((category, result))) => {
                    let auth = matches!(&result, Err(e) if e.is_auth());
                    results.insert(category, result);
                    if auth {
                        warn!(%category, "Authentication failed, halting cycle");
                        return (results, true);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        finished = results.len(),
                        deadline_ms = u64::try_from(self.config.deadline.as_millis()).unwrap_or(u64::MAX),
                        "Cycle deadline exceeded"
                    );
                    break;
                }
            }
        }
        (results, false)
    }
}
