// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Abaco Store
//!
//! Snapshot state, the refresh coordinator, and settings persistence.
//!
//! - [`SnapshotStore`] - the current snapshot behind a `watch` channel
//! - [`RefreshCoordinator`] - one cycle at a time, merge, publish
//! - [`spawn_refresh_task`] - periodic trigger
//! - [`AbacoClient`] - the facade hosts hold on to
//! - [`SettingsStore`] - JSON settings under the user config directory
//! - [`keychain`] - API token storage
//!
//! ## Usage
//!
//! ```ignore
//! use abaco_store::{AbacoClient, Settings};
//!
//! let client = AbacoClient::connect(&settings.base_url, &token, &settings)?;
//! client.validate().await?;
//! client.refresh().await;
//! let snapshot = client.current();
//! ```

pub mod client;
pub mod coordinator;
pub mod error;
pub mod keychain;
pub mod persistence;
pub mod scheduler;
pub mod settings_store;
pub mod snapshot_store;

pub use client::{AbacoClient, TOKEN_ENV_VAR, TokenSource, resolve_token};
pub use coordinator::{
    AUTH_SKIPPED_REASON, CycleReport, DEADLINE_REASON, RefreshConfig, RefreshCoordinator,
    RefreshOutcome,
};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_settings_path, ensure_dir, load_json, load_json_or_default,
    save_json,
};
pub use scheduler::{SchedulerHandle, spawn_refresh_task};
pub use settings_store::{LogLevel, MIN_REFRESH_INTERVAL_SECS, Settings, SettingsStore};
pub use snapshot_store::SnapshotStore;
