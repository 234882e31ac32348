//! Net worth decoders.
//!
//! Items and the summary come from the same envelope:
//!
//! ```json
//! {
//!   "data": [{"id": 3, "name": "S10 Rodeio", "patrimony_type": "vehicle", "current_value": "98000"}],
//!   "summary": {"total_value": "348000", "total_assets": "348000", "total_liabilities": "0"}
//! }
//! ```

use abaco_core::{Category, CategoryData, NetWorthItem, NetWorthSummary, Record, SchemaError};
use serde_json::Value;

use super::DecodeOptions;
use super::fields::{Fields, decode_records, record_list};

const LIST_KEYS: &[&str] = &["data", "items", "patrimony"];
const FALLBACK_SUMMARY_ID: &str = "net_worth_summary";

pub(crate) fn decode_items(
    body: &Value,
    options: &DecodeOptions,
) -> Result<CategoryData, SchemaError> {
    let items = record_list(Category::NetWorthItems, body, LIST_KEYS)?;
    decode_records(Category::NetWorthItems, items, options, decode_item)
}

fn decode_item(f: &Fields<'_>) -> Result<Record, SchemaError> {
    let id = f.id()?;
    Ok(Record::NetWorthItem(NetWorthItem {
        name: f.text(&["name"]).unwrap_or_else(|| format!("Item {id}")),
        item_type: f.text(&["patrimony_type", "type"]),
        item_category: f.text(&["patrimony_category", "category"]),
        current_value: f.money(&["current_value", "value"])?,
        acquisition_value: f.money_or_zero(&["acquisition_value", "purchase_value"])?,
        id,
    }))
}

/// Decodes the `summary` object. An absent summary yields no record; a
/// present one must carry `total_value`.
pub(crate) fn decode_summary(
    body: &Value,
    options: &DecodeOptions,
) -> Result<CategoryData, SchemaError> {
    let envelope = Fields::object(Category::NetWorthSummary, "$", body, options)?;
    let Some(raw) = envelope.raw("summary") else {
        return Ok(CategoryData::default());
    };
    let f = Fields::object(Category::NetWorthSummary, "summary", raw, options)?;

    let summary = NetWorthSummary {
        id: f.id_or(FALLBACK_SUMMARY_ID)?,
        total_value: f.money(&["total_value", "total"])?,
        total_assets: f.money_or_zero(&["total_assets"])?,
        total_liabilities: f.money_or_zero(&["total_liabilities"])?,
        item_count: f.count(&["item_count", "total_items", "count"]),
    };
    Ok(CategoryData::new(vec![Record::NetWorthSummary(summary)]))
}
