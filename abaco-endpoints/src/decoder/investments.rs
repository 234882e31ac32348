//! Investments decoder. The endpoint answers with a bare list.

use abaco_core::{Category, CategoryData, Investment, Record, SchemaError};
use serde_json::Value;

use super::DecodeOptions;
use super::fields::{Fields, decode_records, record_list};

const LIST_KEYS: &[&str] = &["investments", "data"];

pub(crate) fn decode(body: &Value, options: &DecodeOptions) -> Result<CategoryData, SchemaError> {
    let items = record_list(Category::Investments, body, LIST_KEYS)?;
    decode_records(Category::Investments, items, options, decode_investment)
}

fn decode_investment(f: &Fields<'_>) -> Result<Record, SchemaError> {
    let id = f.id()?;
    Ok(Record::Investment(Investment {
        name: f
            .text(&["name"])
            .unwrap_or_else(|| format!("Investment {id}")),
        investment_type: f.text(&["investment_type", "type"]),
        current_value: f.money(&["current_value", "value"])?,
        invested_amount: f.money_or_zero(&["invested_amount", "invested_value", "initial_value"])?,
        id,
    }))
}
