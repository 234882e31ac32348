//! Domain models for Abaco.
//!
//! ## Submodules
//!
//! - [`category`] - The eight data categories
//! - [`money`] - Fixed-point money and ISO currency codes
//! - [`credential`] - Base URL + API token
//! - [`records`] - Typed records per category
//! - [`snapshot`] - Immutable snapshot of a refresh cycle

mod category;
mod credential;
mod money;
mod records;
mod snapshot;

// Re-export everything at the models level
pub use category::Category;
pub use credential::{Credential, DEFAULT_BASE_URL};
pub use money::{Currency, Money, parse_decimal};
pub use records::{
    Account, AccountsSummary, Asset, Card, CardsSummary, CategorySummary, ExternalId, Investment,
    NetWorthItem, NetWorthSummary, NewTransaction, Profile, Record, Transaction, TransactionKind,
};
pub use snapshot::{CategoryData, CategoryEntry, CategoryStatus, CycleOutcome, RecordView, Snapshot};
