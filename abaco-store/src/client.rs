//! Client facade.
//!
//! [`AbacoClient`] owns one credential, its transport and the refresh
//! machinery. Hosts construct it once and pass it by reference.

use std::sync::Arc;
use std::time::Duration;

use abaco_core::{Category, Credential, NewTransaction, Snapshot, Transaction};
use abaco_endpoints::{CategoryFetcher, EndpointRegistry};
use abaco_fetch::{FetchError, HttpTransport, Probe, ProbeResult, Transport};
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::coordinator::{RefreshCoordinator, RefreshOutcome};
use crate::error::StoreError;
use crate::keychain;
use crate::scheduler::{SchedulerHandle, spawn_refresh_task};
use crate::settings_store::Settings;
use crate::snapshot_store::SnapshotStore;

/// Environment variable consulted for the API token.
pub const TOKEN_ENV_VAR: &str = "ABACO_API_TOKEN";

// ============================================================================
// Token resolution
// ============================================================================

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Passed explicitly (command-line flag).
    Explicit,
    /// Read from [`TOKEN_ENV_VAR`].
    Environment,
    /// Read from the system keychain.
    Keychain,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Explicit => "flag",
            Self::Environment => TOKEN_ENV_VAR,
            Self::Keychain => "keychain",
        })
    }
}

/// Resolves the token for `base_url`: explicit value, then the environment,
/// then the keychain. Blank values are skipped.
pub fn resolve_token(
    explicit: Option<&str>,
    base_url: &str,
) -> Result<(String, TokenSource), StoreError> {
    resolve_token_with(
        explicit,
        std::env::var(TOKEN_ENV_VAR).ok(),
        || keychain::load_token(base_url),
    )
}

fn resolve_token_with(
    explicit: Option<&str>,
    env: Option<String>,
    keychain: impl FnOnce() -> Result<Option<String>, StoreError>,
) -> Result<(String, TokenSource), StoreError> {
    let non_blank = |s: &str| !s.trim().is_empty();

    if let Some(token) = explicit.filter(|t| non_blank(t)) {
        return Ok((token.to_string(), TokenSource::Explicit));
    }
    if let Some(token) = env.filter(|t| non_blank(t)) {
        return Ok((token, TokenSource::Environment));
    }
    match keychain()? {
        Some(token) => Ok((token, TokenSource::Keychain)),
        None => Err(StoreError::MissingToken),
    }
}

// ============================================================================
// Client
// ============================================================================

/// A long-lived client for one Abaco account.
pub struct AbacoClient {
    credential: Arc<Credential>,
    transport: Arc<dyn Transport>,
    coordinator: Arc<RefreshCoordinator>,
    refresh_interval: Duration,
}

impl AbacoClient {
    /// Builds a client from a base URL and token.
    pub fn connect(base_url: &str, token: &str, settings: &Settings) -> Result<Self, StoreError> {
        Self::new(Credential::new(base_url, token)?, settings)
    }

    /// Builds a client over HTTP.
    pub fn new(credential: Credential, settings: &Settings) -> Result<Self, StoreError> {
        let credential = Arc::new(credential);
        let transport = HttpTransport::new(Arc::clone(&credential), settings.transport_config())?;
        Ok(Self::with_transport(credential, Arc::new(transport), settings))
    }

    /// Builds a client over any transport.
    pub fn with_transport(
        credential: Arc<Credential>,
        transport: Arc<dyn Transport>,
        settings: &Settings,
    ) -> Self {
        let fetcher = CategoryFetcher::new(Arc::clone(&transport), settings.registry())
            .with_retry(settings.retry_strategy())
            .with_options(settings.decode_options())
            .with_max_pages(settings.max_pages);
        let coordinator = RefreshCoordinator::new(
            fetcher,
            SnapshotStore::new(),
            settings.refresh_config(),
        );
        debug!(base_url = credential.base_str(), "Client constructed");

        Self {
            credential,
            transport,
            coordinator: Arc::new(coordinator),
            refresh_interval: settings.refresh_interval(),
        }
    }

    /// The client's credential (token redacted in `Debug`).
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Probes the API once with this client's credential.
    pub async fn validate(&self) -> Result<(), FetchError> {
        self.health_check().await.outcome
    }

    /// Probes the API once and reports timing, independent of refresh.
    ///
    /// Hits the Profile endpoint, honoring any path override.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> ProbeResult {
        profile_probe(self.coordinator.fetcher().registry())
            .check(self.transport.as_ref())
            .await
    }

    /// Runs a refresh cycle now (or coalesces into the running one).
    pub async fn refresh(&self) -> RefreshOutcome {
        self.coordinator.refresh().await
    }

    /// Latest committed snapshot. Never blocks.
    pub fn current(&self) -> Arc<Snapshot> {
        self.coordinator.store().current()
    }

    /// Observes published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.coordinator.store().subscribe()
    }

    /// Returns true once the token has been rejected during a refresh.
    pub fn needs_reauth(&self) -> bool {
        self.coordinator.needs_reauth()
    }

    /// Starts periodic refreshes at the configured interval.
    pub fn start(&self) -> SchedulerHandle {
        spawn_refresh_task(Arc::clone(&self.coordinator), self.refresh_interval)
    }

    /// Creates a transaction upstream. Not retried.
    pub async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction, FetchError> {
        self.coordinator.fetcher().create_transaction(tx).await
    }
}

/// Probe against the registry's Profile path.
pub(crate) fn profile_probe(registry: &EndpointRegistry) -> Probe {
    registry
        .get(Category::Profile)
        .map_or_else(Probe::default, |d| Probe::new(d.path.clone()))
}

impl std::fmt::Debug for AbacoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbacoClient")
            .field("credential", &self.credential)
            .field("refresh_interval", &self.refresh_interval)
            .field("needs_reauth", &self.needs_reauth())
            .finish_non_exhaustive()
    }
}
