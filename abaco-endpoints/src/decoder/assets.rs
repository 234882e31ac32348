//! Assets decoder.

use abaco_core::{Asset, Category, CategoryData, Record, SchemaError};
use serde_json::Value;

use super::DecodeOptions;
use super::fields::{Fields, decode_records, record_list};

const LIST_KEYS: &[&str] = &["data", "assets"];

pub(crate) fn decode(body: &Value, options: &DecodeOptions) -> Result<CategoryData, SchemaError> {
    let items = record_list(Category::Assets, body, LIST_KEYS)?;
    decode_records(Category::Assets, items, options, decode_asset)
}

fn decode_asset(f: &Fields<'_>) -> Result<Record, SchemaError> {
    let id = f.id()?;
    Ok(Record::Asset(Asset {
        name: f.text(&["name"]).unwrap_or_else(|| format!("Asset {id}")),
        asset_type: f.text(&["asset_type", "type"]),
        icon: f.text(&["icon", "emoji"]),
        quantity: f.decimal_opt(&["quantity"]),
        current_value: f.money(&["current_value", "value"])?,
        id,
    }))
}
