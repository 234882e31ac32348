//! Profile decoder.

use abaco_core::{Category, CategoryData, Currency, Profile, Record, SchemaError, SchemaProblem};
use serde_json::Value;

use super::DecodeOptions;
use super::fields::Fields;

const FALLBACK_ID: &str = "profile";

/// Decodes `/profile`: a single object, optionally wrapped in `data`.
pub(crate) fn decode(body: &Value, options: &DecodeOptions) -> Result<CategoryData, SchemaError> {
    let object = match body.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => body,
    };
    let fields = Fields::object(Category::Profile, "$", object, options)?;

    let default_currency = match fields.get(&["default_currency"]) {
        None => options.default_currency,
        Some((key, Value::String(code))) => Currency::new(code).map_err(|_| {
            SchemaError::new(
                Category::Profile,
                key,
                SchemaProblem::Invalid {
                    reason: "not an ISO 4217 currency code".to_string(),
                },
            )
        })?,
        Some((key, _)) => {
            return Err(SchemaError::wrong_type(
                Category::Profile,
                key,
                "currency code string",
            ));
        }
    };

    let profile = Profile {
        id: fields.id_or(FALLBACK_ID)?,
        name: fields.text(&["name", "full_name"]),
        email: fields.text(&["email"]),
        default_currency,
    };
    Ok(CategoryData::new(vec![Record::Profile(profile)]))
}
