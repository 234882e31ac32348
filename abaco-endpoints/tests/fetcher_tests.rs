//! Category fetcher tests against a scripted transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use abaco_core::{Category, Currency, Money, NewTransaction, TransactionKind};
use abaco_endpoints::{CategoryFetcher, EndpointRegistry};
use abaco_fetch::{ApiRequest, FetchError, Method, RetryStrategy, Transport};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

/// Replays queued responses and records every request.
#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, FetchError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<Value, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, request: &ApiRequest) -> Result<Value, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::Connection("script exhausted".into())))
    }
}

fn fetcher(transport: Arc<ScriptedTransport>) -> CategoryFetcher {
    CategoryFetcher::new(transport, EndpointRegistry::new())
}

#[tokio::test]
async fn test_fetch_single_page() {
    let transport = ScriptedTransport::new(vec![Ok(json!({
        "accounts": [{"id": 1, "name": "Nubank", "current_balance": "10.00"}]
    }))]);
    let data = fetcher(transport.clone()).fetch(Category::Accounts).await.unwrap();

    assert_eq!(data.len(), 1);
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/v1/accounts");
}

#[tokio::test]
async fn test_fetch_drains_pages() {
    let transport = ScriptedTransport::new(vec![
        Ok(json!({
            "transactions": [{"id": 1, "amount": "1"}],
            "pagination": {"current_page": 1, "total_pages": 3}
        })),
        Ok(json!({
            "transactions": [{"id": 2, "amount": "2"}],
            "pagination": {"current_page": 2, "total_pages": 3}
        })),
        Ok(json!({
            "transactions": [{"id": 3, "amount": "3"}],
            "pagination": {"current_page": 3, "total_pages": 3}
        })),
    ]);
    let data = fetcher(transport.clone())
        .fetch(Category::Transactions)
        .await
        .unwrap();

    let ids: Vec<_> = data.records.iter().map(|r| r.id().as_str().to_string()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let pages: Vec<_> = transport
        .requests()
        .iter()
        .map(|r| r.query_value("page").map(str::to_string))
        .collect();
    assert_eq!(pages, vec![None, Some("2".to_string()), Some("3".to_string())]);
}

#[tokio::test]
async fn test_fetch_respects_page_limit() {
    let page = |n: u32| {
        Ok(json!({
            "transactions": [{"id": n, "amount": "1"}],
            "pagination": {"current_page": n, "total_pages": 100}
        }))
    };
    let transport = ScriptedTransport::new((1..=5).map(page).collect());
    let data = fetcher(transport.clone())
        .with_max_pages(2)
        .fetch(Category::Transactions)
        .await
        .unwrap();

    assert_eq!(data.len(), 2);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_retried_per_page() {
    let transport = ScriptedTransport::new(vec![
        Err(FetchError::Server { status: 503 }),
        Err(FetchError::Timeout),
        Ok(json!([{"id": 1, "current_value": "5"}])),
    ]);
    let data = fetcher(transport.clone())
        .fetch(Category::Investments)
        .await
        .unwrap();

    assert_eq!(data.len(), 1);
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_exhausts_retries() {
    let transport = ScriptedTransport::new(vec![
        Err(FetchError::Timeout),
        Err(FetchError::Timeout),
        Err(FetchError::Timeout),
        Err(FetchError::Timeout),
    ]);
    let err = fetcher(transport.clone())
        .with_retry(RetryStrategy::new(3))
        .fetch(Category::Transactions)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout));
    assert_eq!(transport.requests().len(), 4);
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(FetchError::Unauthorized { status: 401 })]);
    let err = fetcher(transport.clone())
        .fetch(Category::Profile)
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_schema_failure_surfaces_as_fetch_error() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"cards": 5}))]);
    let err = fetcher(transport).fetch(Category::Cards).await.unwrap_err();
    assert_eq!(err.kind(), abaco_core::ErrorKind::Schema);
}

#[tokio::test]
async fn test_registry_override_changes_path() {
    let transport = ScriptedTransport::new(vec![Ok(json!({"data": []}))]);
    let fetcher = CategoryFetcher::new(
        transport.clone(),
        EndpointRegistry::new().with_override(Category::Assets, "/api/v2/assets"),
    );
    fetcher.fetch(Category::Assets).await.unwrap();
    assert_eq!(transport.requests()[0].path, "/api/v2/assets");
}

#[tokio::test]
async fn test_net_worth_reads_assets_endpoint() {
    let body = json!({
        "data": [{"id": 3, "name": "S10 Rodeio", "patrimony_type": "vehicle", "current_value": "98000"}],
        "summary": {"total_value": "98000", "item_count": 1}
    });
    let transport = ScriptedTransport::new(vec![Ok(body.clone()), Ok(body.clone()), Ok(body)]);
    let fetcher = fetcher(transport.clone());

    let summary = fetcher.fetch(Category::NetWorthSummary).await.unwrap();
    let items = fetcher.fetch(Category::NetWorthItems).await.unwrap();
    let assets = fetcher.fetch(Category::Assets).await.unwrap();

    assert_eq!(summary.len(), 1);
    assert_eq!(items.records[0].label(), "S10 Rodeio");
    assert_eq!(assets.len(), 1);
    let paths: Vec<_> = transport.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/v1/assets"; 3]);
}

// ============================================================================
// Create transaction
// ============================================================================

fn new_transaction() -> NewTransaction {
    NewTransaction {
        description: "Padaria".to_string(),
        amount: Money::new(dec!(12.50), Currency::BRL),
        date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        kind: TransactionKind::Expense,
        category: None,
        account_id: None,
    }
}

#[tokio::test]
async fn test_create_transaction_posts_and_decodes() {
    let transport = ScriptedTransport::new(vec![Ok(json!({
        "id": 555, "description": "Padaria", "amount": "12.50", "type": "expense"
    }))]);
    let created = fetcher(transport.clone())
        .create_transaction(&new_transaction())
        .await
        .unwrap();

    assert_eq!(created.id.as_str(), "555");
    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/api/v1/transactions");
    assert_eq!(requests[0].body.as_ref().unwrap()["amount"], "12.50");
}

#[tokio::test]
async fn test_create_transaction_is_never_retried() {
    let transport = ScriptedTransport::new(vec![
        Err(FetchError::Server { status: 502 }),
        Ok(json!({"id": 1, "amount": "1"})),
    ]);
    let err = fetcher(transport.clone())
        .create_transaction(&new_transaction())
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(transport.requests().len(), 1);
}
