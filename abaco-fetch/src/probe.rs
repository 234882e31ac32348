//! Connectivity and credential probe.
//!
//! A probe is exactly one lightweight GET (the profile endpoint by default)
//! whose outcome is classified without any other side effect. It backs
//! interactive setup validation and periodic health checks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use abaco_core::{Credential, ErrorKind};
use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::host::HttpTransport;
use crate::transport::{ApiRequest, Transport, TransportConfig};

/// Path probed by default.
pub const DEFAULT_PROBE_PATH: &str = "/api/v1/profile";

/// Result of a probe check.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// `Ok` if the API accepted the credential and answered with JSON.
    pub outcome: Result<(), FetchError>,
    /// Round-trip time.
    pub elapsed: Duration,
}

impl ProbeResult {
    /// Whether the probe succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Failure class, if the probe failed.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.outcome.as_ref().err().map(FetchError::kind)
    }

    /// Response time in milliseconds.
    pub fn response_time_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// A probe for checking that a credential works.
#[derive(Debug, Clone)]
pub struct Probe {
    /// The path to probe.
    pub path: String,
}

impl Probe {
    /// Creates a probe for the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Executes the probe and returns the result.
    #[instrument(skip(self, transport), fields(path = %self.path))]
    pub async fn check(&self, transport: &dyn Transport) -> ProbeResult {
        let start = Instant::now();
        debug!("Running probe");

        let outcome = match transport.request(&ApiRequest::get(&self.path)).await {
            Ok(body) if body.is_object() => Ok(()),
            Ok(_) => Err(FetchError::MalformedBody {
                status: 200,
                reason: "expected a JSON object".to_string(),
            }),
            Err(e) => Err(e),
        };

        let result = ProbeResult {
            outcome,
            elapsed: start.elapsed(),
        };
        debug!(
            success = result.is_success(),
            elapsed_ms = result.response_time_ms(),
            "Probe finished"
        );
        result
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_PATH)
    }
}

/// Validates a credential with a single probe request.
///
/// Nothing is persisted or cached. A token that cannot be sent as a header
/// fails as an auth error without touching the network.
pub async fn validate(
    credential: Arc<Credential>,
    config: TransportConfig,
) -> Result<(), FetchError> {
    validate_with(credential, config, &Probe::default()).await
}

/// Like [`validate`], probing a specific path.
pub async fn validate_with(
    credential: Arc<Credential>,
    config: TransportConfig,
    probe: &Probe,
) -> Result<(), FetchError> {
    let transport = HttpTransport::new(credential, config)?;
    probe.check(&transport).await.outcome
}
