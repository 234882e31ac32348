//! API credential.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::ValidationError;

/// Default upstream API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.abacofinance.com.br";

/// Base URL plus API token. Immutable once constructed.
///
/// The token is held as a [`SecretString`] and is redacted from `Debug`
/// output. Replacing either part means building a new credential.
pub struct Credential {
    base_url: Url,
    base: String,
    token: SecretString,
}

impl Credential {
    /// Builds a credential, normalizing the base URL (trailing slashes are
    /// dropped).
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ValidationError> {
        let token: String = token.into();
        if token.trim().is_empty() {
            return Err(ValidationError::EmptyToken);
        }

        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed =
            Url::parse(trimmed).map_err(|e| ValidationError::InvalidBaseUrl(e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
        if parsed.host_str().is_none() {
            return Err(ValidationError::InvalidBaseUrl("no host in URL".to_string()));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ValidationError::InvalidBaseUrl(
                "base URL must not carry a query or fragment".to_string(),
            ));
        }

        Ok(Self {
            base: trimmed.to_string(),
            base_url: parsed,
            token: SecretString::from(token),
        })
    }

    /// Returns the parsed base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the normalized base URL string (no trailing slash).
    pub fn base_str(&self) -> &str {
        &self.base
    }

    /// Builds the absolute URL for an API path such as `/api/v1/profile`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ValidationError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Url::parse(&format!("{}{}", self.base, path))
            .map_err(|e| ValidationError::InvalidBaseUrl(e.to_string()))
    }

    /// Exposes the raw token. Only the transport should call this.
    pub fn expose_token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("base_url", &self.base)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_trailing_slash() {
        let cred = Credential::new("https://api.abacofinance.com.br/", "tok").unwrap();
        assert_eq!(cred.base_str(), "https://api.abacofinance.com.br");
        assert_eq!(
            cred.endpoint_url("/api/v1/profile").unwrap().as_str(),
            "https://api.abacofinance.com.br/api/v1/profile"
        );
    }

    #[test]
    fn test_keeps_path_prefix() {
        let cred = Credential::new("http://localhost:8080/proxy", "tok").unwrap();
        assert_eq!(
            cred.endpoint_url("api/v1/accounts").unwrap().as_str(),
            "http://localhost:8080/proxy/api/v1/accounts"
        );
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(
            Credential::new(DEFAULT_BASE_URL, "   ").unwrap_err(),
            ValidationError::EmptyToken
        );
        assert!(matches!(
            Credential::new("not a url", "tok"),
            Err(ValidationError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            Credential::new("ftp://example.com", "tok"),
            Err(ValidationError::UnsupportedScheme(_))
        ));
        assert!(Credential::new("https://example.com?x=1", "tok").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new(DEFAULT_BASE_URL, "super-secret-token").unwrap();
        let debug = format!("{cred:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(cred.expose_token(), "super-secret-token");
    }
}
