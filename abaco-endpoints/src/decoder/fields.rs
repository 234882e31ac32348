//! Lenient field access over raw JSON.
//!
//! Only ids and monetary fields are strict. Everything else falls back to
//! `None` (or zero for secondary amounts) when absent or oddly shaped, so a
//! missing nickname never costs a record.

use abaco_core::{
    Category, CategoryData, Currency, ExternalId, Money, Record, SchemaError, SchemaProblem,
    parse_decimal,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use super::DecodeOptions;

/// Keys a currency code may appear under.
const CURRENCY_KEYS: &[&str] = &["currency", "currency_code"];

// ============================================================================
// Fields
// ============================================================================

/// Field reader scoped to one JSON object.
pub(crate) struct Fields<'a> {
    category: Category,
    index: Option<usize>,
    map: &'a Map<String, Value>,
    default_currency: Currency,
}

impl<'a> Fields<'a> {
    /// Reader for the `index`-th record of a list.
    pub(crate) fn record(
        category: Category,
        index: usize,
        value: &'a Value,
        options: &DecodeOptions,
    ) -> Result<Self, SchemaError> {
        match value {
            Value::Object(map) => Ok(Self {
                category,
                index: Some(index),
                map,
                default_currency: options.default_currency,
            }),
            _ => Err(SchemaError::wrong_type(category, "$", "object").at(index)),
        }
    }

    /// Reader for a category-level object (singletons, envelopes).
    pub(crate) fn object(
        category: Category,
        field: &str,
        value: &'a Value,
        options: &DecodeOptions,
    ) -> Result<Self, SchemaError> {
        match value {
            Value::Object(map) => Ok(Self {
                category,
                index: None,
                map,
                default_currency: options.default_currency,
            }),
            _ => Err(SchemaError::wrong_type(category, field, "object")),
        }
    }

    fn error(&self, field: &str, problem: SchemaProblem) -> SchemaError {
        let err = SchemaError::new(self.category, field, problem);
        match self.index {
            Some(i) => err.at(i),
            None => err,
        }
    }

    /// First non-null value among `keys`.
    pub(crate) fn get(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        keys.iter()
            .find_map(|k| self.map.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))
    }

    /// Raw value under `key`, if non-null.
    pub(crate) fn raw(&self, key: &'static str) -> Option<&'a Value> {
        self.get(&[key]).map(|(_, v)| v)
    }

    /// Required external id under `id`.
    pub(crate) fn id(&self) -> Result<ExternalId, SchemaError> {
        match self.raw("id") {
            Some(value) => self.parse_id(value),
            None => Err(self.error("id", SchemaProblem::Missing)),
        }
    }

    /// External id under `id`, or `fallback` when absent.
    pub(crate) fn id_or(&self, fallback: &str) -> Result<ExternalId, SchemaError> {
        match self.raw("id") {
            Some(value) => self.parse_id(value),
            None => Ok(ExternalId::new(fallback)),
        }
    }

    fn parse_id(&self, value: &Value) -> Result<ExternalId, SchemaError> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Ok(ExternalId::new(s.trim())),
            Value::String(_) => Err(self.error(
                "id",
                SchemaProblem::Invalid {
                    reason: "empty id".to_string(),
                },
            )),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(ExternalId::new(n.to_string())),
            _ => Err(self.error(
                "id",
                SchemaProblem::WrongType {
                    expected: "string or integer".to_string(),
                },
            )),
        }
    }

    /// Optional text. Numbers and booleans are rendered, anything else is
    /// ignored.
    pub(crate) fn text(&self, keys: &[&'static str]) -> Option<String> {
        keys.iter().find_map(|k| match self.map.get(*k)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Record currency, falling back to the configured default when absent.
    pub(crate) fn currency(&self) -> Result<Currency, SchemaError> {
        match self.get(CURRENCY_KEYS) {
            None => Ok(self.default_currency),
            Some((key, Value::String(code))) => Currency::new(code).map_err(|_| {
                self.error(
                    key,
                    SchemaProblem::Invalid {
                        reason: "not an ISO 4217 currency code".to_string(),
                    },
                )
            }),
            Some((key, _)) => Err(self.error(
                key,
                SchemaProblem::WrongType {
                    expected: "currency code string".to_string(),
                },
            )),
        }
    }

    fn decimal_at(&self, key: &str, value: &Value) -> Result<Decimal, SchemaError> {
        decimal_value(value).map_err(|problem| self.error(key, problem))
    }

    /// Required amount in the record currency.
    pub(crate) fn money(&self, keys: &[&'static str]) -> Result<Money, SchemaError> {
        let currency = self.currency()?;
        match self.get(keys) {
            Some((key, value)) => Ok(Money::new(self.decimal_at(key, value)?, currency)),
            None => Err(self.error(keys.first().copied().unwrap_or("amount"), SchemaProblem::Missing)),
        }
    }

    /// Secondary amount; zero when absent, an error when malformed.
    pub(crate) fn money_or_zero(&self, keys: &[&'static str]) -> Result<Money, SchemaError> {
        let currency = self.currency()?;
        Ok(self
            .money_opt(keys)?
            .unwrap_or_else(|| Money::zero(currency)))
    }

    /// Optional amount; `None` when absent, an error when malformed.
    pub(crate) fn money_opt(&self, keys: &[&'static str]) -> Result<Option<Money>, SchemaError> {
        let currency = self.currency()?;
        match self.get(keys) {
            Some((key, value)) => Ok(Some(Money::new(self.decimal_at(key, value)?, currency))),
            None => Ok(None),
        }
    }

    /// Optional non-monetary decimal (quantities).
    pub(crate) fn decimal_opt(&self, keys: &[&'static str]) -> Option<Decimal> {
        self.get(keys).and_then(|(_, v)| decimal_value(v).ok())
    }

    /// Optional count.
    pub(crate) fn count(&self, keys: &[&'static str]) -> Option<u32> {
        match self.get(keys)?.1 {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Optional day of month (1-31).
    pub(crate) fn day(&self, keys: &[&'static str]) -> Option<u8> {
        self.count(keys)
            .and_then(|d| u8::try_from(d).ok())
            .filter(|d| (1..=31).contains(d))
    }

    /// Optional calendar date. Accepts `YYYY-MM-DD` and RFC 3339 timestamps.
    pub(crate) fn date(&self, keys: &[&'static str]) -> Option<NaiveDate> {
        match self.get(keys)?.1 {
            Value::String(s) => parse_date(s),
            _ => None,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Converts a JSON number or numeric string into a [`Decimal`].
///
/// Numbers go through their textual form so `1500.25` stays exactly
/// `1500.25`.
pub(crate) fn decimal_value(value: &Value) -> Result<Decimal, SchemaProblem> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => {
            return Err(SchemaProblem::WrongType {
                expected: "number or numeric string".to_string(),
            });
        }
    };
    parse_decimal(&text).ok_or_else(|| SchemaProblem::Invalid {
        reason: "not a decimal number".to_string(),
    })
}

/// Parses the date part of `YYYY-MM-DD[...]`.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Locates the record list in a response body.
///
/// A top-level array is the list itself. Otherwise the first of `keys`
/// holding an array is used; if none is present the list is empty.
pub(crate) fn record_list<'a>(
    category: Category,
    body: &'a Value,
    keys: &[&'static str],
) -> Result<&'a [Value], SchemaError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            for key in keys {
                match map.get(*key) {
                    Some(Value::Array(items)) => return Ok(items),
                    Some(Value::Null) | None => {}
                    Some(_) => return Err(SchemaError::wrong_type(category, *key, "array")),
                }
            }
            Ok(&[])
        }
        _ => Err(SchemaError::wrong_type(category, "$", "object or array")),
    }
}

/// Decodes every item independently. A failed item lands in `rejected`
/// while its siblings still decode.
///
/// If every item of a non-empty list fails, the category itself fails:
/// publishing an empty list would read as "no data".
pub(crate) fn decode_records<F>(
    category: Category,
    items: &[Value],
    options: &DecodeOptions,
    decode_one: F,
) -> Result<CategoryData, SchemaError>
where
    F: Fn(&Fields<'_>) -> Result<Record, SchemaError>,
{
    let mut data = CategoryData::default();
    for (index, item) in items.iter().enumerate() {
        match Fields::record(category, index, item, options).and_then(|f| decode_one(&f)) {
            Ok(record) => data.records.push(record),
            Err(err) => {
                debug!(location = %err.location(), problem = %err.problem, "Rejected record");
                data.rejected.push(err);
            }
        }
    }

    if data.records.is_empty() {
        if let Some(first) = data.rejected.first() {
            return Err(first.clone());
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn options() -> DecodeOptions {
        DecodeOptions::default()
    }

    #[test]
    fn test_decimal_value_is_exact() {
        assert_eq!(decimal_value(&json!(1500.25)).unwrap(), dec!(1500.25));
        assert_eq!(decimal_value(&json!("0.1")).unwrap(), dec!(0.1));
        assert_eq!(decimal_value(&json!(42)).unwrap(), dec!(42));
        assert!(matches!(
            decimal_value(&json!("abc")),
            Err(SchemaProblem::Invalid { .. })
        ));
        assert!(matches!(
            decimal_value(&json!(true)),
            Err(SchemaProblem::WrongType { .. })
        ));
    }

    #[test]
    fn test_id_accepts_string_and_integer() {
        let v = json!({"id": 42});
        let f = Fields::record(Category::Accounts, 0, &v, &options()).unwrap();
        assert_eq!(f.id().unwrap().as_str(), "42");

        let v = json!({"id": "acc-1"});
        let f = Fields::record(Category::Accounts, 0, &v, &options()).unwrap();
        assert_eq!(f.id().unwrap().as_str(), "acc-1");

        let v = json!({"id": 1.5});
        let f = Fields::record(Category::Accounts, 3, &v, &options()).unwrap();
        assert_eq!(f.id().unwrap_err().location(), "accounts[3].id");
    }

    #[test]
    fn test_currency_defaults_and_validates() {
        let v = json!({});
        let f = Fields::record(Category::Cards, 0, &v, &options()).unwrap();
        assert_eq!(f.currency().unwrap(), Currency::BRL);

        let v = json!({"currency": "usd"});
        let f = Fields::record(Category::Cards, 0, &v, &options()).unwrap();
        assert_eq!(f.currency().unwrap(), Currency::USD);

        let v = json!({"currency": 986});
        let f = Fields::record(Category::Cards, 0, &v, &options()).unwrap();
        assert!(f.currency().is_err());
    }

    #[test]
    fn test_money_required_and_secondary() {
        let v = json!({"current_balance": "10.50"});
        let f = Fields::record(Category::Cards, 0, &v, &options()).unwrap();
        assert_eq!(f.money(&["current_balance"]).unwrap().amount, dec!(10.50));
        assert!(f.money_or_zero(&["limit"]).unwrap().is_zero());
        assert_eq!(
            f.money(&["missing"]).unwrap_err().problem,
            SchemaProblem::Missing
        );
    }

    #[test]
    fn test_lenient_helpers() {
        let v = json!({
            "name": "  Conta  ",
            "closing_day": 40,
            "due_day": "10",
            "date": "2024-03-15T10:00:00Z",
            "nickname": {"nested": true}
        });
        let f = Fields::record(Category::Cards, 0, &v, &options()).unwrap();
        assert_eq!(f.text(&["name"]).as_deref(), Some("Conta"));
        assert_eq!(f.text(&["nickname"]), None);
        assert_eq!(f.day(&["closing_day"]), None);
        assert_eq!(f.day(&["due_day"]), Some(10));
        assert_eq!(f.date(&["date"]), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_record_list_shapes() {
        let top = json!([{"id": 1}]);
        assert_eq!(record_list(Category::Investments, &top, &["data"]).unwrap().len(), 1);

        let wrapped = json!({"data": [{"id": 1}, {"id": 2}]});
        assert_eq!(
            record_list(Category::Investments, &wrapped, &["investments", "data"])
                .unwrap()
                .len(),
            2
        );

        let absent = json!({"other": 1});
        assert!(record_list(Category::Accounts, &absent, &["accounts"]).unwrap().is_empty());

        let wrong = json!({"accounts": {"id": 1}});
        assert!(record_list(Category::Accounts, &wrong, &["accounts"]).is_err());

        assert!(record_list(Category::Accounts, &json!("nope"), &["accounts"]).is_err());
    }
}
