//! Transactions decoder and encoder.

use abaco_core::{
    Category, CategoryData, ExternalId, NewTransaction, Record, SchemaError, Transaction,
    TransactionKind,
};
use serde_json::{Value, json};

use super::DecodeOptions;
use super::fields::{Fields, decode_records, record_list};

const LIST_KEYS: &[&str] = &["transactions", "data"];

pub(crate) fn decode(body: &Value, options: &DecodeOptions) -> Result<CategoryData, SchemaError> {
    let items = record_list(Category::Transactions, body, LIST_KEYS)?;
    decode_records(Category::Transactions, items, options, |f| {
        decode_transaction(f).map(Record::Transaction)
    })
}

fn decode_transaction(f: &Fields<'_>) -> Result<Transaction, SchemaError> {
    Ok(Transaction {
        id: f.id()?,
        description: f
            .text(&["description", "name", "title"])
            .unwrap_or_default(),
        amount: f.money(&["amount", "value"])?,
        date: f.date(&["date", "transaction_date", "created_at"]),
        kind: f
            .text(&["type", "kind", "transaction_type"])
            .map(|t| TransactionKind::from_api(&t))
            .unwrap_or_default(),
        category: f.text(&["category", "category_name"]).or_else(|| {
            f.raw("category")
                .and_then(|c| c.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string)
        }),
        account_id: f.text(&["account_id"]).map(ExternalId::from),
    })
}

/// Decodes the body of a `201 Created` answer to a transaction POST.
///
/// Accepts the transaction itself or one wrapped in `data`/`transaction`.
pub fn decode_created_transaction(
    body: &Value,
    options: &DecodeOptions,
) -> Result<Transaction, SchemaError> {
    let object = ["data", "transaction"]
        .iter()
        .find_map(|k| body.get(*k).filter(|v| v.is_object()))
        .unwrap_or(body);
    let fields = Fields::object(Category::Transactions, "$", object, options)?;
    decode_transaction(&fields)
}

/// Builds the JSON body for creating a transaction.
///
/// The amount is sent as a decimal string so no precision is lost.
pub fn encode_new_transaction(tx: &NewTransaction) -> Value {
    let mut body = json!({
        "description": tx.description,
        "amount": tx.amount.amount.to_string(),
        "currency": tx.amount.currency.as_str(),
        "date": tx.date.format("%Y-%m-%d").to_string(),
        "type": tx.kind.as_str(),
    });
    if let Some(category) = &tx.category {
        body["category"] = json!(category);
    }
    if let Some(account_id) = &tx.account_id {
        body["account_id"] = json!(account_id.as_str());
    }
    body
}
