//! Core error types for Abaco.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Category;

// ============================================================================
// Core Error
// ============================================================================

/// Core error type for Abaco operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid currency code.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Invalid amount.
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// Unknown category name.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// Validation Error
// ============================================================================

/// Rejected input when constructing a [`Credential`](crate::Credential).
///
/// Never carries the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The token is empty after trimming.
    #[error("API token is empty")]
    EmptyToken,

    /// The base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The base URL uses something other than http/https.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

// ============================================================================
// Error Kind
// ============================================================================

/// The four-way failure taxonomy every fetch error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Token invalid or expired. User action required.
    Auth,
    /// Network or server-side failure. Eligible for retry.
    Transient,
    /// Unexpected status or malformed body. Not retried.
    Protocol,
    /// A decoded field was missing or of the wrong shape. Not retried.
    Schema,
}

impl ErrorKind {
    /// Returns a short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Transient => "transient",
            Self::Protocol => "protocol",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Schema Error
// ============================================================================

/// What was wrong with a field during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum SchemaProblem {
    /// The field is absent or null.
    Missing,
    /// The field has the wrong JSON type.
    WrongType {
        /// What the decoder expected.
        expected: String,
    },
    /// The field has the right type but an unusable value.
    Invalid {
        /// Why the value was rejected.
        reason: String,
    },
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing required field"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::Invalid { reason } => f.write_str(reason),
        }
    }
}

/// Decode-time failure, scoped to one category (and optionally one record).
///
/// Only raised for fields needed for correlation (the external identifier)
/// or monetary correctness (amount, currency).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaError {
    /// Category being decoded.
    pub category: Category,
    /// Index of the offending record within the payload, if record-scoped.
    pub index: Option<usize>,
    /// Dotted field path.
    pub field: String,
    /// What went wrong.
    #[serde(flatten)]
    pub problem: SchemaProblem,
}

impl SchemaError {
    /// Creates a category-scoped error.
    pub fn new(category: Category, field: impl Into<String>, problem: SchemaProblem) -> Self {
        Self {
            category,
            index: None,
            field: field.into(),
            problem,
        }
    }

    /// Creates a missing-field error.
    pub fn missing(category: Category, field: impl Into<String>) -> Self {
        Self::new(category, field, SchemaProblem::Missing)
    }

    /// Creates a wrong-type error.
    pub fn wrong_type(
        category: Category,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(
            category,
            field,
            SchemaProblem::WrongType {
                expected: expected.into(),
            },
        )
    }

    /// Scopes this error to a record index.
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Returns `category[index].field` or `category.field`.
    pub fn location(&self) -> String {
        match self.index {
            Some(i) => format!("{}[{}].{}", self.category, i, self.field),
            None => format!("{}.{}", self.category, self.field),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location(), self.problem)
    }
}

impl std::error::Error for SchemaError {}
