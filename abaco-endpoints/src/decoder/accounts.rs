//! Accounts decoder.
//!
//! ```json
//! {
//!   "accounts": [{"id": 1, "name": "Nubank", "current_balance": "1500.25"}],
//!   "total_accounts": 1,
//!   "summary": [{"total_balance": "1500.25", "account_count": 1}]
//! }
//! ```

use abaco_core::{Account, AccountsSummary, Category, CategoryData, CategorySummary, Record, SchemaError};
use serde_json::Value;
use tracing::debug;

use super::DecodeOptions;
use super::fields::{Fields, decode_records, record_list};

const LIST_KEYS: &[&str] = &["accounts", "data"];
const BALANCE_KEYS: &[&str] = &["current_balance", "balance"];

pub(crate) fn decode(body: &Value, options: &DecodeOptions) -> Result<CategoryData, SchemaError> {
    let items = record_list(Category::Accounts, body, LIST_KEYS)?;
    let data = decode_records(Category::Accounts, items, options, decode_account)?;
    Ok(data.with_summary(summary(body, options)))
}

fn decode_account(f: &Fields<'_>) -> Result<Record, SchemaError> {
    let id = f.id()?;
    Ok(Record::Account(Account {
        name: f
            .text(&["name"])
            .unwrap_or_else(|| format!("Account {id}")),
        nickname: f.text(&["nickname"]),
        account_type: f.text(&["account_type", "type"]),
        institution: f.text(&["institution", "institution_name", "bank_name"]),
        balance: f.money(BALANCE_KEYS)?,
        id,
    }))
}

fn summary(body: &Value, options: &DecodeOptions) -> Option<CategorySummary> {
    let envelope = Fields::object(Category::Accounts, "$", body, options).ok()?;
    let first = envelope
        .raw("summary")
        .and_then(|s| s.as_array().and_then(|a| a.first()).or(Some(s)))
        .and_then(|s| Fields::object(Category::Accounts, "summary", s, options).ok());

    let (total_balance, account_count) = match &first {
        Some(f) => {
            let balance = f.money_opt(&["total_balance"]).unwrap_or_else(|err| {
                debug!(error = %err, "Ignoring malformed accounts summary balance");
                None
            });
            (balance, f.count(&["account_count"]))
        }
        None => (None, None),
    };

    let summary = AccountsSummary {
        total_accounts: envelope.count(&["total_accounts"]),
        total_balance,
        account_count,
    };
    (summary != AccountsSummary::default()).then_some(CategorySummary::Accounts(summary))
}
