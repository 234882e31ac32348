//! Data categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One independently fetched and decoded slice of the user's financial data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// User profile (singleton).
    Profile,
    /// Bank accounts.
    Accounts,
    /// Credit cards.
    Cards,
    /// Investment positions.
    Investments,
    /// Consolidated net worth (singleton).
    NetWorthSummary,
    /// Individual net-worth items.
    NetWorthItems,
    /// Physical and other tracked assets.
    Assets,
    /// Transactions.
    Transactions,
}

impl Category {
    /// Returns every category, profile first.
    ///
    /// The order is the order a refresh cycle starts fetches in.
    pub fn all() -> &'static [Category] {
        &[
            Self::Profile,
            Self::Accounts,
            Self::Cards,
            Self::Investments,
            Self::NetWorthSummary,
            Self::NetWorthItems,
            Self::Assets,
            Self::Transactions,
        ]
    }

    /// Returns the machine name (snake case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Accounts => "accounts",
            Self::Cards => "cards",
            Self::Investments => "investments",
            Self::NetWorthSummary => "net_worth_summary",
            Self::NetWorthItems => "net_worth_items",
            Self::Assets => "assets",
            Self::Transactions => "transactions",
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Accounts => "Accounts",
            Self::Cards => "Credit Cards",
            Self::Investments => "Investments",
            Self::NetWorthSummary => "Net Worth",
            Self::NetWorthItems => "Net Worth Items",
            Self::Assets => "Assets",
            Self::Transactions => "Transactions",
        }
    }

    /// Returns true for categories that hold exactly one record.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Self::Profile | Self::NetWorthSummary)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let category = match normalized.as_str() {
            "profile" => Self::Profile,
            "accounts" | "account" => Self::Accounts,
            "cards" | "card" | "credit_cards" => Self::Cards,
            "investments" | "investment" => Self::Investments,
            "net_worth_summary" | "net_worth" | "patrimony_summary" => Self::NetWorthSummary,
            "net_worth_items" | "patrimony" => Self::NetWorthItems,
            "assets" | "asset" => Self::Assets,
            "transactions" | "transaction" => Self::Transactions,
            _ => return Err(CoreError::UnknownCategory(s.to_string())),
        };
        Ok(category)
    }
}
