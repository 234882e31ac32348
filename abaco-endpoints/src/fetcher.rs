//! Category fetcher.
//!
//! Fetches one category end to end: builds the request from the registry,
//! retries transient failures, drains pagination and decodes every page.

use std::sync::Arc;

use abaco_core::{Category, CategoryData, NewTransaction, Transaction};
use abaco_fetch::{ApiRequest, FetchError, RetryStrategy, Transport};
use tracing::{debug, info, instrument, warn};

use crate::decoder::{self, DecodeOptions, decode_created_transaction, encode_new_transaction};
use crate::registry::EndpointRegistry;

/// Default upper bound on pages drained per category.
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Fetches and decodes categories over a [`Transport`].
#[derive(Clone)]
pub struct CategoryFetcher {
    transport: Arc<dyn Transport>,
    registry: EndpointRegistry,
    retry: RetryStrategy,
    options: DecodeOptions,
    max_pages: u32,
}

impl CategoryFetcher {
    /// Creates a fetcher with default retry, decode and paging settings.
    pub fn new(transport: Arc<dyn Transport>, registry: EndpointRegistry) -> Self {
        Self {
            transport,
            registry,
            retry: RetryStrategy::default(),
            options: DecodeOptions::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Sets the retry strategy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the decode options.
    #[must_use]
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the page limit (at least 1).
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Returns the endpoint registry.
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Fetches every page of a category.
    ///
    /// Each page gets the full retry budget. Any page failing fails the
    /// category; partially drained listings are never returned.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn fetch(&self, category: Category) -> Result<CategoryData, FetchError> {
        let descriptor = self
            .registry
            .get(category)
            .ok_or_else(|| FetchError::InvalidUrl(format!("no endpoint for {category}")))?;

        let mut data = CategoryData::default();
        let mut page = 1;
        let mut pages_fetched = 0;

        loop {
            let request = descriptor.request(page);
            let body = self.send(category, &request).await?;
            let decoded = decoder::decode(category, &body, &self.options)?;
            pages_fetched += 1;

            let next = descriptor
                .is_paginated()
                .then_some(decoded.page_info)
                .flatten()
                .and_then(|info| info.next_after(page));
            data.extend(decoded.data);

            match next {
                Some(_) if pages_fetched >= self.max_pages => {
                    warn!(pages = pages_fetched, "Page limit reached, listing truncated");
                    break;
                }
                Some(next_page) => {
                    debug!(page = next_page, "Fetching next page");
                    page = next_page;
                }
                None => break,
            }
        }

        if !data.rejected.is_empty() {
            warn!(
                rejected = data.rejected.len(),
                kept = data.len(),
                "Some records failed to decode"
            );
        }
        debug!(records = data.len(), pages = pages_fetched, "Category fetched");
        Ok(data)
    }

    async fn send(&self, category: Category, request: &ApiRequest) -> Result<serde_json::Value, FetchError> {
        self.retry
            .run(category.as_str(), || self.transport.request(request))
            .await
    }

    /// Creates a transaction upstream. Never retried, since a repeated POST
    /// could create a duplicate.
    #[instrument(skip(self, tx))]
    pub async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction, FetchError> {
        let path = self
            .registry
            .get(Category::Transactions)
            .map(|d| d.path.clone())
            .ok_or_else(|| FetchError::InvalidUrl("no endpoint for transactions".to_string()))?;

        let request = ApiRequest::post(path, encode_new_transaction(tx));
        let body = self.transport.request(&request).await?;
        let created = decode_created_transaction(&body, &self.options)?;
        info!(id = %created.id, "Transaction created");
        Ok(created)
    }
}

impl std::fmt::Debug for CategoryFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryFetcher")
            .field("registry", &self.registry)
            .field("retry", &self.retry)
            .field("options", &self.options)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}
