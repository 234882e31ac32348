//! Transport abstraction.
//!
//! Everything above this layer talks to the API through [`Transport`], so
//! decoders and the refresh coordinator can be exercised against an
//! in-memory implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FetchError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Request
// ============================================================================

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
}

impl Method {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A request relative to the credential's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Method.
    pub method: Method,
    /// Path such as `/api/v1/accounts`.
    pub path: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// JSON body (POST only).
    pub body: Option<Value>,
}

impl ApiRequest {
    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Returns the value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// Auth scheme
// ============================================================================

/// How the token is attached to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `X-API-Token: <token>`, what the upstream API expects.
    #[default]
    ApiTokenHeader,
    /// `Authorization: Bearer <token>`.
    Bearer,
}

/// Transport tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// How the token is sent.
    pub auth_scheme: AuthScheme,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            auth_scheme: AuthScheme::default(),
        }
    }
}

// ============================================================================
// Transport trait
// ============================================================================

/// Executes authenticated requests and returns the decoded JSON body of a
/// 2xx response.
///
/// Implementations must classify failures into [`FetchError`] variants so
/// that [`FetchError::kind`] is meaningful. They never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one request.
    async fn request(&self, request: &ApiRequest) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn request(&self, request: &ApiRequest) -> Result<Value, FetchError> {
        (**self).request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::get("/api/v1/transactions").with_query("page", 2);
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.query_value("page"), Some("2"));
        assert_eq!(req.query_value("limit"), None);

        let post = ApiRequest::post("/api/v1/transactions", json!({"amount": "1.00"}));
        assert_eq!(post.method.as_str(), "POST");
        assert!(post.body.is_some());
    }

    #[test]
    fn test_auth_scheme_serde() {
        assert_eq!(
            serde_json::to_string(&AuthScheme::ApiTokenHeader).unwrap(),
            r#""api_token_header""#
        );
        let scheme: AuthScheme = serde_json::from_str(r#""bearer""#).unwrap();
        assert_eq!(scheme, AuthScheme::Bearer);
    }
}
