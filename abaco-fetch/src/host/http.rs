//! HTTP transport over reqwest.
//!
//! Adds the auth header, applies the per-request timeout and classifies the
//! response status into [`FetchError`] variants.

use std::sync::Arc;
use std::time::Duration;

use abaco_core::Credential;
use async_trait::async_trait;
use reqwest::header::{self, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;
use crate::transport::{ApiRequest, AuthScheme, Method, Transport, TransportConfig};

/// Header the upstream API reads the token from.
pub const API_TOKEN_HEADER: &str = "x-api-token";

/// User agent string for Abaco.
const USER_AGENT: &str = concat!("abaco/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Transport
// ============================================================================

/// Transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
    credential: Arc<Credential>,
    config: TransportConfig,
}

impl HttpTransport {
    /// Creates a transport for the given credential.
    pub fn new(credential: Arc<Credential>, config: TransportConfig) -> Result<Self, FetchError> {
        let inner = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            credential,
            config,
        })
    }

    /// Returns the credential this transport authenticates with.
    pub fn credential(&self) -> &Arc<Credential> {
        &self.credential
    }

    fn auth_header(&self) -> Result<(HeaderName, HeaderValue), FetchError> {
        let token = self.credential.expose_token();
        let (name, value) = match self.config.auth_scheme {
            AuthScheme::ApiTokenHeader => (
                HeaderName::from_static(API_TOKEN_HEADER),
                HeaderValue::from_str(token),
            ),
            AuthScheme::Bearer => (
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")),
            ),
        };
        let mut value = value.map_err(|_| FetchError::MalformedToken)?;
        value.set_sensitive(true);
        Ok((name, value))
    }

    fn map_send_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Connection(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = %request.path))]
    async fn request(&self, request: &ApiRequest) -> Result<Value, FetchError> {
        let (auth_name, auth_value) = self.auth_header()?;

        let mut url = self.credential.endpoint_url(&request.path)?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let builder = match request.method {
            Method::Get => self.inner.get(url),
            Method::Post => self.inner.post(url),
        }
        .header(auth_name, auth_value)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json");

        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        debug!("Sending request");
        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        debug!(status = %status, "Response received");

        if let Some(err) = classify_status(status, response.retry_after()) {
            if err.is_auth() {
                warn!(status = status.as_u16(), "API rejected the token");
            }
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!(status = status.as_u16(), "Response body is empty");
            return Err(FetchError::MalformedBody {
                status: status.as_u16(),
                reason: "empty body".to_string(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(status = status.as_u16(), "Response body is not valid JSON");
            FetchError::MalformedBody {
                status: status.as_u16(),
                reason: e.to_string(),
            }
        })
    }
}

/// Maps a non-2xx status onto a [`FetchError`]. Returns `None` for 2xx.
pub fn classify_status(status: StatusCode, retry_after: Option<Duration>) -> Option<FetchError> {
    let code = status.as_u16();
    if status.is_success() {
        None
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Some(FetchError::Unauthorized { status: code })
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Some(FetchError::RateLimited { retry_after })
    } else if status.is_server_error() {
        Some(FetchError::Server { status: code })
    } else {
        Some(FetchError::UnexpectedStatus { status: code })
    }
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Get the Retry-After header value.
    fn retry_after(&self) -> Option<Duration>;
}

impl ResponseExt for Response {
    fn retry_after(&self) -> Option<Duration> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK, None).is_none());
        assert!(classify_status(StatusCode::CREATED, None).is_none());
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, None),
            Some(FetchError::Unauthorized { status: 401 })
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, None),
            Some(FetchError::Unauthorized { status: 403 })
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some(Duration::from_secs(5))),
            Some(FetchError::RateLimited { retry_after: Some(d) }) if d == Duration::from_secs(5)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, None),
            Some(FetchError::Server { status: 502 })
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, None),
            Some(FetchError::UnexpectedStatus { status: 404 })
        ));
    }

    #[test]
    fn test_malformed_token_is_rejected_before_sending() {
        let credential =
            Arc::new(Credential::new("https://example.com", "bad\ntoken").unwrap());
        let transport = HttpTransport::new(credential, TransportConfig::default()).unwrap();
        assert!(matches!(transport.auth_header(), Err(FetchError::MalformedToken)));
    }

    #[test]
    fn test_bearer_header() {
        let credential = Arc::new(Credential::new("https://example.com", "tok").unwrap());
        let transport = HttpTransport::new(
            credential,
            TransportConfig {
                auth_scheme: AuthScheme::Bearer,
                ..TransportConfig::default()
            },
        )
        .unwrap();
        let (name, value) = transport.auth_header().unwrap();
        assert_eq!(name, header::AUTHORIZATION);
        assert_eq!(value.to_str().unwrap(), "Bearer tok");
        assert!(value.is_sensitive());
    }
}
