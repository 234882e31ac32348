//! Credit cards decoder.

use abaco_core::{Card, CardsSummary, Category, CategoryData, CategorySummary, Record, SchemaError};
use serde_json::Value;
use tracing::debug;

use super::DecodeOptions;
use super::fields::{Fields, decode_records, record_list};

const LIST_KEYS: &[&str] = &["cards", "credit_cards", "data"];

pub(crate) fn decode(body: &Value, options: &DecodeOptions) -> Result<CategoryData, SchemaError> {
    let items = record_list(Category::Cards, body, LIST_KEYS)?;
    let data = decode_records(Category::Cards, items, options, decode_card)?;
    Ok(data.with_summary(summary(body, options)))
}

fn decode_card(f: &Fields<'_>) -> Result<Record, SchemaError> {
    let id = f.id()?;
    Ok(Record::Card(Card {
        name: f.text(&["name"]).unwrap_or_else(|| format!("Card {id}")),
        brand: f.text(&["brand", "flag"]),
        current_balance: f.money(&["current_balance", "balance", "used"])?,
        limit: f.money_or_zero(&["limit", "credit_limit", "total_limit"])?,
        available: f.money_or_zero(&["available", "available_limit"])?,
        closing_day: f.day(&["closing_day"]),
        due_day: f.day(&["due_day"]),
        id,
    }))
}

fn summary(body: &Value, options: &DecodeOptions) -> Option<CategorySummary> {
    let f = Fields::object(Category::Cards, "$", body, options).ok()?;
    let amount = |key: &'static str| {
        f.money_opt(&[key]).unwrap_or_else(|err| {
            debug!(error = %err, "Ignoring malformed cards summary field");
            None
        })
    };

    let summary = CardsSummary {
        total_cards: f.count(&["total_cards"]),
        total_limit: amount("total_limit"),
        total_used: amount("total_used"),
        total_available: amount("total_available"),
    };
    (summary != CardsSummary::default()).then_some(CategorySummary::Cards(summary))
}
