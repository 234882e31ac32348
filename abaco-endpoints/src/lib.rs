// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Abaco Endpoints
//!
//! Per-category knowledge of the Abaco Finance API.
//!
//! Each category has:
//!
//! - **Descriptor**: the path it is fetched from and its pagination scheme
//! - **Decoder**: raw JSON to typed records, with per-record failure isolation
//!
//! ## Categories
//!
//! | Category | Default path | Envelope | Paginated |
//! |----------|--------------|----------|-----------|
//! | Profile | `/api/v1/profile` | object | no |
//! | Accounts | `/api/v1/accounts` | `accounts[]` + summary | no |
//! | Cards | `/api/v1/credit-cards` | `cards[]` + totals | no |
//! | Investments | `/api/v1/investments` | bare list | no |
//! | Net worth summary | `/api/v1/assets` | `summary` | no |
//! | Net worth items | `/api/v1/assets` | `data[]` | no |
//! | Assets | `/api/v1/assets` | `data[]` | no |
//! | Transactions | `/api/v1/transactions` | `transactions[]` | `page` |
//!
//! ## Usage
//!
//! ```ignore
//! use abaco_endpoints::{CategoryFetcher, EndpointRegistry};
//! use abaco_core::Category;
//!
//! let fetcher = CategoryFetcher::new(transport, EndpointRegistry::new());
//! let accounts = fetcher.fetch(Category::Accounts).await?;
//! ```

pub mod decoder;
pub mod descriptor;
pub mod fetcher;
pub mod pagination;
pub mod registry;

// Re-export key types
pub use decoder::{
    DecodeOptions, DecodedPage, decode, decode_created_transaction, encode_new_transaction,
};
pub use descriptor::{API_PREFIX, EndpointDescriptor, Pagination};
pub use fetcher::{CategoryFetcher, DEFAULT_MAX_PAGES};
pub use pagination::PageInfo;
pub use registry::EndpointRegistry;
