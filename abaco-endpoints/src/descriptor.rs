//! Endpoint descriptors.
//!
//! A descriptor holds the static configuration for one category:
//! - The API path it is fetched from
//! - Whether (and how) the listing is paginated

use abaco_core::Category;
use abaco_fetch::ApiRequest;

/// Default path prefix of the upstream API.
pub const API_PREFIX: &str = "/api/v1";

// ============================================================================
// Pagination
// ============================================================================

/// How a listing is split across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// One request returns everything.
    Single,
    /// Pages are selected with a numeric query parameter, starting at 1.
    PageParam {
        /// Query parameter name.
        param: &'static str,
    },
}

// ============================================================================
// Endpoint Descriptor
// ============================================================================

/// Where and how a category is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Category served.
    pub category: Category,
    /// Path relative to the base URL.
    pub path: String,
    /// Pagination scheme.
    pub pagination: Pagination,
}

impl EndpointDescriptor {
    /// Creates a descriptor.
    pub fn new(category: Category, path: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            category,
            path: normalize_path(&path.into()),
            pagination,
        }
    }

    /// Built-in descriptor for a category.
    pub fn default_for(category: Category) -> Self {
        let (path, pagination) = match category {
            Category::Profile => ("profile", Pagination::Single),
            Category::Accounts => ("accounts", Pagination::Single),
            Category::Cards => ("credit-cards", Pagination::Single),
            Category::Investments => ("investments", Pagination::Single),
            // One response carries the item list and the consolidated summary.
            Category::NetWorthSummary | Category::NetWorthItems | Category::Assets => {
                ("assets", Pagination::Single)
            }
            Category::Transactions => ("transactions", Pagination::PageParam { param: "page" }),
        };
        Self::new(category, format!("{API_PREFIX}/{path}"), pagination)
    }

    /// Returns true if the listing is paginated.
    pub fn is_paginated(&self) -> bool {
        matches!(self.pagination, Pagination::PageParam { .. })
    }

    /// Builds the GET request for `page` (1-based). The first page is
    /// requested without a page parameter.
    pub fn request(&self, page: u32) -> ApiRequest {
        let request = ApiRequest::get(&self.path);
        match self.pagination {
            Pagination::PageParam { param } if page > 1 => request.with_query(param, page),
            _ => request,
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
