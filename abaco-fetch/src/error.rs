//! Fetch error types.

use std::time::Duration;

use abaco_core::{ErrorKind, SchemaError};
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for a single request or decode.
///
/// Messages carry HTTP status codes and short reasons only. Response bodies
/// and the API token never appear in them.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The API rejected the token (HTTP 401/403).
    #[error("Authentication rejected (HTTP {status})")]
    Unauthorized {
        /// Status code returned.
        status: u16,
    },

    /// The token cannot be sent as an HTTP header value.
    #[error("API token contains characters not allowed in an HTTP header")]
    MalformedToken,

    /// The request did not complete within the transport timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Server-side failure (HTTP 5xx).
    #[error("Server error (HTTP {status})")]
    Server {
        /// Status code returned.
        status: u16,
    },

    /// Rate limited (HTTP 429).
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay requested by the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// Any other non-2xx status.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// Status code returned.
        status: u16,
    },

    /// A 2xx response whose body is not the JSON shape expected.
    #[error("Malformed response body (HTTP {status}): {reason}")]
    MalformedBody {
        /// Status code returned.
        status: u16,
        /// Parser message. Never includes the body itself.
        reason: String,
    },

    /// The request URL could not be built.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// A field needed for correlation or monetary correctness failed to decode.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl FetchError {
    /// Maps this error onto the four-way taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } | Self::MalformedToken => ErrorKind::Auth,
            Self::Timeout
            | Self::Connection(_)
            | Self::Server { .. }
            | Self::RateLimited { .. } => ErrorKind::Transient,
            Self::UnexpectedStatus { .. } | Self::MalformedBody { .. } | Self::InvalidUrl(_) => {
                ErrorKind::Protocol
            }
            Self::Schema(_) => ErrorKind::Schema,
        }
    }

    /// Returns true if the request may be retried within the same cycle.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Returns true if the token was rejected.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Delay the server asked for, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<abaco_core::ValidationError> for FetchError {
    fn from(err: abaco_core::ValidationError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abaco_core::Category;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(FetchError::Unauthorized { status: 401 }.kind(), ErrorKind::Auth);
        assert_eq!(FetchError::MalformedToken.kind(), ErrorKind::Auth);
        assert_eq!(FetchError::Timeout.kind(), ErrorKind::Transient);
        assert_eq!(FetchError::Server { status: 502 }.kind(), ErrorKind::Transient);
        assert_eq!(
            FetchError::RateLimited { retry_after: None }.kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            FetchError::UnexpectedStatus { status: 404 }.kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            FetchError::Schema(SchemaError::missing(Category::Accounts, "id")).kind(),
            ErrorKind::Schema
        );
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(FetchError::Connection("refused".into()).is_retryable());
        assert!(!FetchError::Unauthorized { status: 403 }.is_retryable());
        assert!(
            !FetchError::MalformedBody {
                status: 200,
                reason: "expected value".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_retry_after() {
        let err = FetchError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(FetchError::Timeout.retry_after(), None);
    }
}
