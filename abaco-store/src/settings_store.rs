//! User preferences store.
//!
//! Settings are JSON on disk, edited through [`SettingsStore`]. They never
//! hold the API token.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use abaco_core::{Category, Credential, Currency, DEFAULT_BASE_URL};
use abaco_endpoints::{DecodeOptions, EndpointRegistry};
use abaco_fetch::{AuthScheme, Probe, RetryStrategy, TransportConfig};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::coordinator::RefreshConfig;
use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Shortest refresh interval accepted.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API base URL.
    pub base_url: String,

    /// Seconds between scheduled refresh cycles.
    pub refresh_interval_secs: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Overall deadline for one refresh cycle, in seconds.
    pub cycle_deadline_secs: u64,

    // ========================================================================
    // Retry
    // ========================================================================
    /// Retries per request for transient failures.
    pub max_retries: u32,

    /// First backoff delay in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Backoff ceiling in milliseconds.
    pub retry_max_delay_ms: u64,

    // ========================================================================
    // Fetching
    // ========================================================================
    /// Category fetches allowed in flight at once.
    pub max_concurrency: usize,

    /// Pages drained per paginated category.
    pub max_pages: u32,

    /// Currency assumed for records that do not state one.
    pub default_currency: Currency,

    /// How the token is sent.
    pub auth_scheme: AuthScheme,

    /// Per-category API path overrides.
    pub endpoint_overrides: BTreeMap<Category, String>,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval_secs: 300,
            request_timeout_secs: 10,
            cycle_deadline_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 8000,
            max_concurrency: 4,
            max_pages: abaco_endpoints::DEFAULT_MAX_PAGES,
            default_currency: Currency::BRL,
            auth_scheme: AuthScheme::default(),
            endpoint_overrides: BTreeMap::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Refresh interval, never shorter than [`MIN_REFRESH_INTERVAL_SECS`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }

    /// Transport settings.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            auth_scheme: self.auth_scheme,
        }
    }

    /// Retry policy for category fetches.
    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::new(self.max_retries)
            .with_base_delay(Duration::from_millis(self.retry_base_delay_ms))
            .with_max_delay(Duration::from_millis(
                self.retry_max_delay_ms.max(self.retry_base_delay_ms),
            ))
    }

    /// Cycle settings for the refresh coordinator.
    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            deadline: Duration::from_secs(self.cycle_deadline_secs.max(1)),
            max_concurrency: self.max_concurrency.max(1),
        }
    }

    /// Decoder settings.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            default_currency: self.default_currency,
        }
    }

    /// Endpoint registry with the configured overrides applied.
    pub fn registry(&self) -> EndpointRegistry {
        EndpointRegistry::new().with_overrides(
            self.endpoint_overrides
                .iter()
                .map(|(category, path)| (*category, path.as_str())),
        )
    }

    /// Connectivity probe for the configured Profile path.
    pub fn profile_probe(&self) -> Probe {
        crate::client::profile_probe(&self.registry())
    }

    /// Builds a credential for the configured base URL.
    pub fn credential(&self, token: impl Into<String>) -> Result<Credential, StoreError> {
        Ok(Credential::new(&self.base_url, token)?)
    }

    /// Sets one field from its string form, as used by `config set`.
    ///
    /// Path overrides use the key `endpoint.<category>`; an empty value
    /// removes the override.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let value = value.trim();
        match key {
            "base_url" => {
                // Reject now rather than at the next client construction.
                Credential::new(value, "-")?;
                self.base_url = value.trim_end_matches('/').to_string();
            }
            "refresh_interval_secs" => {
                let secs = parse_number(key, value)?;
                if secs < MIN_REFRESH_INTERVAL_SECS {
                    return Err(StoreError::Config(format!(
                        "refresh_interval_secs must be at least {MIN_REFRESH_INTERVAL_SECS}"
                    )));
                }
                self.refresh_interval_secs = secs;
            }
            "request_timeout_secs" => self.request_timeout_secs = parse_number(key, value)?,
            "cycle_deadline_secs" => self.cycle_deadline_secs = parse_number(key, value)?,
            "max_retries" => self.max_retries = parse_number(key, value)?,
            "retry_base_delay_ms" => self.retry_base_delay_ms = parse_number(key, value)?,
            "retry_max_delay_ms" => self.retry_max_delay_ms = parse_number(key, value)?,
            "max_concurrency" => self.max_concurrency = parse_number(key, value)?,
            "max_pages" => self.max_pages = parse_number(key, value)?,
            "default_currency" => {
                self.default_currency =
                    Currency::new(value).map_err(|e| StoreError::Config(e.to_string()))?;
            }
            "auth_scheme" => {
                self.auth_scheme = serde_json::from_value(serde_json::Value::String(value.into()))
                    .map_err(|_| {
                        StoreError::Config(format!(
                            "auth_scheme must be api_token_header or bearer, got {value:?}"
                        ))
                    })?;
            }
            "log_level" => {
                self.log_level = serde_json::from_value(serde_json::Value::String(
                    value.to_ascii_lowercase(),
                ))
                .map_err(|_| StoreError::Config(format!("unknown log level {value:?}")))?;
            }
            other => {
                let Some(name) = other.strip_prefix("endpoint.") else {
                    return Err(StoreError::Config(format!("unknown setting {other:?}")));
                };
                let category: Category = name
                    .parse()
                    .map_err(|e: abaco_core::CoreError| StoreError::Config(e.to_string()))?;
                if value.is_empty() {
                    self.endpoint_overrides.remove(&category);
                } else {
                    self.endpoint_overrides.insert(category, value.to_string());
                }
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, StoreError> {
    value
        .parse()
        .map_err(|_| StoreError::Config(format!("{key} expects a non-negative integer, got {value:?}")))
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings with their backing file.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding default settings.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing or unreadable file yields
    /// defaults.
    pub async fn load(path: PathBuf) -> Self {
        let settings = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Applies a fallible edit. Nothing changes if `f` fails.
    pub async fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Settings) -> Result<(), StoreError>,
    {
        let mut settings = self.settings.write().await;
        let mut edited = settings.clone();
        f(&mut edited)?;
        *settings = edited;
        Ok(())
    }

    /// Restores defaults in memory.
    pub async fn reset(&self) {
        *self.settings.write().await = Settings::default();
    }

    /// Saves settings to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
