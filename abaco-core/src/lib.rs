// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Abaco Core
//!
//! Core types, models, and the error taxonomy shared by every Abaco crate.
//!
//! This crate has no I/O. It provides:
//!
//! - Domain models (categories, money, typed records, snapshots)
//! - The credential type (base URL + redacted API token)
//! - Error types and the `Auth | Transient | Protocol | Schema` taxonomy
//!
//! ## Key Types
//!
//! ### Data
//! - [`Category`] - The eight independently fetched data categories
//! - [`Money`] / [`Currency`] - Fixed-point amounts with an ISO currency code
//! - [`Record`] - A decoded unit belonging to one category
//! - [`CategoryData`] - All records (plus API-provided summary) for a category
//!
//! ### Snapshot
//! - [`Snapshot`] - Immutable view of the latest refresh cycle
//! - [`CategoryStatus`] - `Ok`, `Stale` or `Failed` per category
//! - [`CycleOutcome`] - How the cycle that produced a snapshot ended
//!
//! ### Access
//! - [`Credential`] - Base URL and API token, immutable once built

pub mod error;
pub mod models;

// Re-export error types
pub use error::{CoreError, ErrorKind, SchemaError, SchemaProblem, ValidationError};

// Re-export all model types
pub use models::{
    // Category
    Category,
    // Money
    Currency,
    Money,
    parse_decimal,
    // Credential
    Credential,
    DEFAULT_BASE_URL,
    // Records
    Account,
    AccountsSummary,
    Asset,
    Card,
    CardsSummary,
    CategorySummary,
    ExternalId,
    Investment,
    NetWorthItem,
    NetWorthSummary,
    NewTransaction,
    Profile,
    Record,
    Transaction,
    TransactionKind,
    // Snapshot
    CategoryData,
    CategoryEntry,
    CategoryStatus,
    CycleOutcome,
    RecordView,
    Snapshot,
};
