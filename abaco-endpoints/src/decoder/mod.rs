//! Response decoders, one per category.
//!
//! Decoding is pure: raw JSON in, typed [`CategoryData`] out. Failures are
//! confined to the smallest unit possible. A bad record is rejected on its
//! own, a bad envelope fails the category, and nothing here can fail a
//! whole refresh cycle.

mod accounts;
mod assets;
mod cards;
pub(crate) mod fields;
mod investments;
mod net_worth;
mod profile;
pub(crate) mod transactions;

use abaco_core::{Category, CategoryData, Currency, SchemaError};
use serde_json::Value;

use crate::pagination::PageInfo;

pub use transactions::{decode_created_transaction, encode_new_transaction};

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Currency assumed for records that do not state one.
    pub default_currency: Currency,
}

/// One decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    /// Decoded records, summary and rejected records.
    pub data: CategoryData,
    /// Pagination metadata, if the response carried any.
    pub page_info: Option<PageInfo>,
}

/// Decodes one response body for `category`.
pub fn decode(
    category: Category,
    body: &Value,
    options: &DecodeOptions,
) -> Result<DecodedPage, SchemaError> {
    let data = match category {
        Category::Profile => profile::decode(body, options),
        Category::Accounts => accounts::decode(body, options),
        Category::Cards => cards::decode(body, options),
        Category::Investments => investments::decode(body, options),
        Category::NetWorthSummary => net_worth::decode_summary(body, options),
        Category::NetWorthItems => net_worth::decode_items(body, options),
        Category::Assets => assets::decode(body, options),
        Category::Transactions => transactions::decode(body, options),
    }?;

    Ok(DecodedPage {
        data,
        page_info: PageInfo::from_body(body),
    })
}
