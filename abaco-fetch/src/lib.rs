// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Abaco Fetch
//!
//! Authenticated transport for the Abaco Finance API.
//!
//! ## Transport
//!
//! - [`Transport`] - Trait every request goes through
//! - [`host::http::HttpTransport`] - reqwest implementation: auth header,
//!   bounded timeout, status classification
//!
//! ## Failure handling
//!
//! - [`FetchError`] - Classified failures, mapped onto
//!   [`ErrorKind`](abaco_core::ErrorKind) by [`FetchError::kind`]
//! - [`RetryStrategy`] - Bounded exponential backoff for transient failures
//!
//! ## Validation
//!
//! - [`Probe`] / [`validate`] - One lightweight request to check a credential
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use abaco_core::Credential;
//! use abaco_fetch::{validate, TransportConfig};
//!
//! let credential = Arc::new(Credential::new("https://api.abacofinance.com.br", token)?);
//! validate(credential, TransportConfig::default()).await?;
//! ```

pub mod error;
pub mod host;
pub mod probe;
pub mod retry;
pub mod transport;

// Errors
pub use error::FetchError;

// Transport
pub use host::HttpTransport;
pub use transport::{
    ApiRequest, AuthScheme, DEFAULT_TIMEOUT, Method, Transport, TransportConfig,
};

// Validation & retry
pub use probe::{DEFAULT_PROBE_PATH, Probe, ProbeResult, validate, validate_with};
pub use retry::RetryStrategy;
