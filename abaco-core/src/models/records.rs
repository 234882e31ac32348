//! Typed records, one family per category.
//!
//! Every record that stands for a remote entity carries an [`ExternalId`]
//! so downstream entities can be correlated across refreshes.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::money::{Currency, Money};

// ============================================================================
// External Id
// ============================================================================

/// Stable upstream identifier. Numeric ids are kept in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    /// Creates an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ExternalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Per-category records
// ============================================================================

/// The account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Upstream id, or `profile` when the API omits one.
    pub id: ExternalId,
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Currency the user reports in.
    pub default_currency: Currency,
}

/// A bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Upstream id.
    pub id: ExternalId,
    /// Account name.
    pub name: String,
    /// User-chosen nickname.
    pub nickname: Option<String>,
    /// Account type (checking, savings, ...).
    pub account_type: Option<String>,
    /// Institution name.
    pub institution: Option<String>,
    /// Current balance.
    pub balance: Money,
}

/// A credit card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Upstream id.
    pub id: ExternalId,
    /// Card name.
    pub name: String,
    /// Card brand (visa, mastercard, ...).
    pub brand: Option<String>,
    /// Current statement balance.
    pub current_balance: Money,
    /// Credit limit. Zero when not reported.
    pub limit: Money,
    /// Available limit. Zero when not reported.
    pub available: Money,
    /// Statement closing day of month.
    pub closing_day: Option<u8>,
    /// Payment due day of month.
    pub due_day: Option<u8>,
}

/// An investment position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    /// Upstream id.
    pub id: ExternalId,
    /// Position name.
    pub name: String,
    /// Investment type (fixed income, stocks, ...).
    pub investment_type: Option<String>,
    /// Current market value.
    pub current_value: Money,
    /// Amount originally invested. Zero when not reported.
    pub invested_amount: Money,
}

/// Consolidated net worth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetWorthSummary {
    /// Upstream id, or `net_worth_summary` when the API omits one.
    pub id: ExternalId,
    /// Total value.
    pub total_value: Money,
    /// Total of assets. Zero when not reported.
    pub total_assets: Money,
    /// Total of liabilities. Zero when not reported.
    pub total_liabilities: Money,
    /// Number of items the total covers.
    pub item_count: Option<u32>,
}

/// One net-worth item (property, vehicle, land, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetWorthItem {
    /// Upstream id.
    pub id: ExternalId,
    /// Item name.
    pub name: String,
    /// Item type (`vehicle`, `property`, ...).
    pub item_type: Option<String>,
    /// Item category (`land`, ...).
    pub item_category: Option<String>,
    /// Current value.
    pub current_value: Money,
    /// Acquisition value. Zero when not reported.
    pub acquisition_value: Money,
}

/// A tracked asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Upstream id.
    pub id: ExternalId,
    /// Asset name.
    pub name: String,
    /// Asset type.
    pub asset_type: Option<String>,
    /// Icon hint as sent by the API (often an emoji).
    pub icon: Option<String>,
    /// Quantity held.
    pub quantity: Option<Decimal>,
    /// Current value.
    pub current_value: Money,
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money in.
    Income,
    /// Money out.
    Expense,
    /// Between the user's own accounts.
    Transfer,
    /// Anything else.
    #[default]
    Other,
}

impl TransactionKind {
    /// Maps upstream type strings, English or Portuguese.
    pub fn from_api(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "receita" | "credit" => Self::Income,
            "expense" | "despesa" | "debit" => Self::Expense,
            "transfer" | "transferencia" | "transferência" => Self::Transfer,
            _ => Self::Other,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::Other => "other",
        }
    }
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Upstream id.
    pub id: ExternalId,
    /// Description. Empty when not reported.
    pub description: String,
    /// Amount.
    pub amount: Money,
    /// Booking date.
    pub date: Option<NaiveDate>,
    /// Direction.
    pub kind: TransactionKind,
    /// Spending category.
    pub category: Option<String>,
    /// Account the transaction belongs to.
    pub account_id: Option<ExternalId>,
}

/// Input for creating a transaction upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Description.
    pub description: String,
    /// Amount.
    pub amount: Money,
    /// Booking date.
    pub date: NaiveDate,
    /// Direction.
    pub kind: TransactionKind,
    /// Spending category.
    pub category: Option<String>,
    /// Account to book against.
    pub account_id: Option<ExternalId>,
}

// ============================================================================
// Summaries returned alongside a category
// ============================================================================

/// Aggregates the accounts endpoint reports itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsSummary {
    /// `total_accounts`.
    pub total_accounts: Option<u32>,
    /// `summary[0].total_balance`.
    pub total_balance: Option<Money>,
    /// `summary[0].account_count`.
    pub account_count: Option<u32>,
}

/// Aggregates the credit-cards endpoint reports itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardsSummary {
    /// `total_cards`.
    pub total_cards: Option<u32>,
    /// `total_limit`.
    pub total_limit: Option<Money>,
    /// `total_used`.
    pub total_used: Option<Money>,
    /// `total_available`.
    pub total_available: Option<Money>,
}

/// API-provided summary attached to a category's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategorySummary {
    /// Accounts summary.
    Accounts(AccountsSummary),
    /// Cards summary.
    Cards(CardsSummary),
}

// ============================================================================
// Record
// ============================================================================

/// A decoded unit belonging to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    /// Profile record.
    Profile(Profile),
    /// Account record.
    Account(Account),
    /// Card record.
    Card(Card),
    /// Investment record.
    Investment(Investment),
    /// Net worth summary record.
    NetWorthSummary(NetWorthSummary),
    /// Net worth item record.
    NetWorthItem(NetWorthItem),
    /// Asset record.
    Asset(Asset),
    /// Transaction record.
    Transaction(Transaction),
}

impl Record {
    /// Returns the category this record belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::Profile(_) => Category::Profile,
            Self::Account(_) => Category::Accounts,
            Self::Card(_) => Category::Cards,
            Self::Investment(_) => Category::Investments,
            Self::NetWorthSummary(_) => Category::NetWorthSummary,
            Self::NetWorthItem(_) => Category::NetWorthItems,
            Self::Asset(_) => Category::Assets,
            Self::Transaction(_) => Category::Transactions,
        }
    }

    /// Returns the external identifier.
    pub fn id(&self) -> &ExternalId {
        match self {
            Self::Profile(r) => &r.id,
            Self::Account(r) => &r.id,
            Self::Card(r) => &r.id,
            Self::Investment(r) => &r.id,
            Self::NetWorthSummary(r) => &r.id,
            Self::NetWorthItem(r) => &r.id,
            Self::Asset(r) => &r.id,
            Self::Transaction(r) => &r.id,
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::Profile(r) => r.name.as_deref().unwrap_or("Profile"),
            Self::Account(r) => r.nickname.as_deref().unwrap_or(&r.name),
            Self::Card(r) => &r.name,
            Self::Investment(r) => &r.name,
            Self::NetWorthSummary(_) => "Net Worth",
            Self::NetWorthItem(r) => &r.name,
            Self::Asset(r) => &r.name,
            Self::Transaction(r) => &r.description,
        }
    }

    /// Returns the headline monetary value, if the record has one.
    pub fn primary_amount(&self) -> Option<&Money> {
        match self {
            Self::Profile(_) => None,
            Self::Account(r) => Some(&r.balance),
            Self::Card(r) => Some(&r.current_balance),
            Self::Investment(r) => Some(&r.current_value),
            Self::NetWorthSummary(r) => Some(&r.total_value),
            Self::NetWorthItem(r) => Some(&r.current_value),
            Self::Asset(r) => Some(&r.current_value),
            Self::Transaction(r) => Some(&r.amount),
        }
    }

    /// Stable key of the form `<category>_<external id>` for correlating
    /// downstream entities across refreshes.
    pub fn entity_key(&self) -> String {
        format!("{}_{}", self.category(), self.id())
    }
}
