//! Store error types.

use abaco_core::ValidationError;
use abaco_fetch::FetchError;
use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The base URL or token was rejected before any request.
    #[error("Invalid credential: {0}")]
    Validation(#[from] ValidationError),

    /// An API call failed.
    #[error("Request failed: {0}")]
    Fetch(#[from] FetchError),

    /// No token was supplied and none is stored.
    #[error("No API token configured (use --token, ABACO_API_TOKEN, or `abaco login`)")]
    MissingToken,

    /// Keychain access failed.
    #[error("Keychain error: {0}")]
    Keychain(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Fetch(e) => e.is_retryable(),
            StoreError::Io(_) => true,
            _ => false,
        }
    }

    /// Returns true if the user must supply a new token.
    pub fn needs_reauth(&self) -> bool {
        match self {
            StoreError::Fetch(e) => e.is_auth(),
            StoreError::MissingToken | StoreError::Validation(ValidationError::EmptyToken) => true,
            _ => false,
        }
    }
}
