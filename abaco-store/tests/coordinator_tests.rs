//! Refresh cycle behavior against an in-memory transport.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use abaco_core::{Category, CategoryStatus, Credential, CycleOutcome, ErrorKind, Record};
use abaco_endpoints::{DecodeOptions, decode};
use abaco_fetch::{ApiRequest, FetchError, Method, Transport};
use abaco_store::{
    AUTH_SKIPPED_REASON, AbacoClient, DEADLINE_REASON, RefreshOutcome, Settings,
};
use async_trait::async_trait;
use serde_json::{Value, json};

// ============================================================================
// Routed transport
// ============================================================================

/// Answers by path: queued one-shot responses first, then the path's
/// standing response. Counts every call.
#[derive(Default)]
struct RoutedTransport {
    standing: Mutex<HashMap<String, Result<Value, FetchError>>>,
    queued: Mutex<HashMap<String, VecDeque<Result<Value, FetchError>>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl RoutedTransport {
    fn healthy() -> Arc<Self> {
        let transport = Self::default();
        for (path, body) in healthy_payloads() {
            transport.set(path, Ok(body));
        }
        Arc::new(transport)
    }

    fn set(&self, path: &str, response: Result<Value, FetchError>) {
        self.standing.lock().unwrap().insert(path.to_string(), response);
    }

    fn queue(&self, path: &str, responses: Vec<Result<Value, FetchError>>) {
        self.queued
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .extend(responses);
    }

    fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(path.to_string(), delay);
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    async fn request(&self, request: &ApiRequest) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(request.clone());
        let delay = self.delays.lock().unwrap().get(&request.path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front);
        queued.unwrap_or_else(|| {
            self.standing
                .lock()
                .unwrap()
                .get(&request.path)
                .cloned()
                .unwrap_or(Err(FetchError::UnexpectedStatus { status: 404 }))
        })
    }
}

fn healthy_payloads() -> Vec<(&'static str, Value)> {
    vec![
        (
            "/api/v1/profile",
            json!({"id": 7, "name": "Maria", "email": "maria@example.com", "default_currency": "BRL"}),
        ),
        (
            "/api/v1/accounts",
            json!({
                "accounts": [{"id": 1, "name": "Nubank", "current_balance": "1500.00"}],
                "total_accounts": 1
            }),
        ),
        (
            "/api/v1/credit-cards",
            json!({"cards": [{"id": 2, "name": "Visa", "current_balance": "300.10", "limit": "5000"}]}),
        ),
        (
            "/api/v1/investments",
            json!([{"id": 3, "name": "CDB", "current_value": "10000.00"}]),
        ),
        (
            "/api/v1/assets",
            json!({
                "data": [{"id": 4, "name": "S10 Rodeio", "patrimony_type": "vehicle", "current_value": "98000"}],
                "summary": {"total_value": "98000.00", "total_items": 1}
            }),
        ),
        (
            "/api/v1/transactions",
            json!({"transactions": [{"id": 6, "description": "Padaria", "amount": "12.50", "type": "expense"}]}),
        ),
    ]
}

fn client_with(transport: Arc<RoutedTransport>, settings: &Settings) -> AbacoClient {
    let credential = Arc::new(Credential::new("https://api.example.com", "test-token").unwrap());
    AbacoClient::with_transport(credential, transport, settings)
}

fn client(transport: Arc<RoutedTransport>) -> AbacoClient {
    client_with(transport, &Settings::default())
}

fn sequential() -> Settings {
    Settings {
        max_concurrency: 1,
        ..Settings::default()
    }
}

// ============================================================================
// Successful cycles
// ============================================================================

#[tokio::test]
async fn test_full_cycle_round_trips_decoded_data() {
    let transport = RoutedTransport::healthy();
    let client = client(transport.clone());

    let outcome = client.refresh().await;
    let report = outcome.report().unwrap();
    assert_eq!(report.revision, 1);
    assert_eq!(report.outcome, CycleOutcome::Complete);

    let snapshot = client.current();
    let payloads: HashMap<_, _> = healthy_payloads().into_iter().collect();
    let registry = Settings::default().registry();
    for category in Category::all() {
        let path = &registry.get(*category).unwrap().path;
        let expected = decode(*category, &payloads[path.as_str()], &DecodeOptions::default())
            .unwrap()
            .data;
        assert_eq!(snapshot.status(*category), Some(&CategoryStatus::Ok));
        assert_eq!(snapshot.data(*category), Some(&expected), "{category} differs");
    }

    // Assets and both net-worth views read the same path, one request each.
    assert_eq!(transport.call_count(), 8);
    assert_eq!(transport.calls_to("/api/v1/assets"), 3);
    assert_eq!(transport.calls_to("/api/v1/patrimony"), 0);
}

#[tokio::test]
async fn test_record_lookup_by_external_id() {
    let client = client(RoutedTransport::healthy());
    client.refresh().await;

    let snapshot = client.current();
    let view = snapshot.record(Category::Accounts, "1").unwrap();
    assert!(!view.is_stale());
    assert_eq!(view.record.label(), "Nubank");
    assert!(snapshot.record_by_key("transactions_6").is_some());
    assert_eq!(snapshot.profile().unwrap().name.as_deref(), Some("Maria"));
}

#[tokio::test]
async fn test_revisions_increase_and_are_observed() {
    let client = client(RoutedTransport::healthy());
    let mut rx = client.subscribe();

    client.refresh().await;
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().revision(), 1);

    client.refresh().await;
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().revision(), 2);
}

// ============================================================================
// Degradation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_transient_failure_keeps_previous_value_as_stale() {
    let transport = RoutedTransport::healthy();
    let client = client(transport.clone());
    client.refresh().await;
    let before = client.current();

    transport.queue(
        "/api/v1/transactions",
        (0..4).map(|_| Err(FetchError::Timeout)).collect(),
    );
    transport.set(
        "/api/v1/accounts",
        Ok(json!({"accounts": [{"id": 1, "name": "Nubank", "current_balance": "1750.00"}]})),
    );

    let report = client.refresh().await.report().cloned().unwrap();
    assert_eq!(
        report.outcome,
        CycleOutcome::Partial {
            failed: vec![Category::Transactions]
        }
    );

    let after = client.current();
    let entry = after.entry(Category::Transactions).unwrap();
    assert!(entry.status.is_stale());
    assert_eq!(entry.error_kind, Some(ErrorKind::Transient));
    assert_eq!(entry.data, before.entry(Category::Transactions).unwrap().data);
    assert_eq!(
        entry.last_success,
        before.entry(Category::Transactions).unwrap().last_success
    );

    // Every other category carries fresh data.
    for category in Category::all().iter().filter(|c| **c != Category::Transactions) {
        assert!(after.status(*category).unwrap().is_ok(), "{category} not ok");
    }
    let Record::Account(account) = after.record(Category::Accounts, "1").unwrap().record else {
        panic!("expected account");
    };
    assert_eq!(account.balance.amount.to_string(), "1750.00");

    // Initial attempt plus three retries.
    assert_eq!(transport.calls_to("/api/v1/transactions"), 1 + 4);
}

#[tokio::test]
async fn test_failure_without_history_is_failed_not_stale() {
    let transport = RoutedTransport::healthy();
    transport.set("/api/v1/credit-cards", Ok(json!({"cards": "nope"})));
    let client = client(transport);

    client.refresh().await;
    let snapshot = client.current();
    let entry = snapshot.entry(Category::Cards).unwrap();
    assert!(entry.status.is_failed());
    assert!(entry.data.is_none());
    assert_eq!(entry.error_kind, Some(ErrorKind::Schema));
    assert!(snapshot.status(Category::Accounts).unwrap().is_ok());
}

#[tokio::test]
async fn test_protocol_error_is_not_retried() {
    let transport = RoutedTransport::healthy();
    transport.set("/api/v1/assets", Err(FetchError::UnexpectedStatus { status: 404 }));
    let client = client(transport.clone());

    client.refresh().await;
    assert_eq!(transport.calls_to("/api/v1/assets"), 3);
    for category in [Category::Assets, Category::NetWorthItems, Category::NetWorthSummary] {
        assert_eq!(
            client.current().entry(category).unwrap().error_kind,
            Some(ErrorKind::Protocol)
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_commits_partial_cycle() {
    let transport = RoutedTransport::healthy();
    transport.delay("/api/v1/transactions", Duration::from_secs(60));
    let settings = Settings {
        cycle_deadline_secs: 5,
        ..Settings::default()
    };
    let client = client_with(transport, &settings);

    let report = client.refresh().await.report().cloned().unwrap();
    assert_eq!(
        report.outcome,
        CycleOutcome::Partial {
            failed: vec![Category::Transactions]
        }
    );

    let snapshot = client.current();
    let entry = snapshot.entry(Category::Transactions).unwrap();
    assert_eq!(entry.status.reason(), Some(DEADLINE_REASON));
    assert_eq!(entry.error_kind, Some(ErrorKind::Transient));
    assert!(snapshot.status(Category::Profile).unwrap().is_ok());
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_auth_failure_halts_cycle() {
    let transport = RoutedTransport::healthy();
    transport.set("/api/v1/profile", Err(FetchError::Unauthorized { status: 401 }));
    let client = client_with(transport.clone(), &sequential());

    let report = client.refresh().await.report().cloned().unwrap();
    assert_eq!(report.outcome, CycleOutcome::AuthFailed);
    assert_eq!(transport.call_count(), 1);

    let snapshot = client.current();
    assert!(snapshot.needs_reauth());
    let skipped = snapshot.entry(Category::Transactions).unwrap();
    assert!(skipped.status.is_failed());
    assert_eq!(skipped.status.reason(), Some(AUTH_SKIPPED_REASON));
    assert!(client.needs_reauth());
}

#[tokio::test]
async fn test_auth_failure_latches() {
    let transport = RoutedTransport::healthy();
    transport.queue("/api/v1/profile", vec![Err(FetchError::Unauthorized { status: 403 })]);
    let client = client_with(transport.clone(), &sequential());

    client.refresh().await;
    let calls = transport.call_count();

    // The token would work now, but the latch holds until a new client.
    assert_eq!(client.refresh().await, RefreshOutcome::AuthRequired);
    assert_eq!(transport.call_count(), calls);
    assert_eq!(client.current().revision(), 1);
}

#[tokio::test]
async fn test_auth_failure_after_success_keeps_stale_values() {
    let transport = RoutedTransport::healthy();
    let client = client_with(transport.clone(), &sequential());
    client.refresh().await;

    transport.set("/api/v1/profile", Err(FetchError::Unauthorized { status: 401 }));
    client.refresh().await;

    let snapshot = client.current();
    assert_eq!(*snapshot.outcome(), CycleOutcome::AuthFailed);
    let accounts = snapshot.record(Category::Accounts, "1").unwrap();
    assert!(accounts.is_stale());
    assert_eq!(
        snapshot.entry(Category::Profile).unwrap().error_kind,
        Some(ErrorKind::Auth)
    );
}

// ============================================================================
// Coalescing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_trigger_is_coalesced() {
    let transport = RoutedTransport::healthy();
    transport.delay("/api/v1/profile", Duration::from_secs(2));
    let client = client(transport.clone());

    let (first, second) = tokio::join!(client.refresh(), client.refresh());

    assert!(matches!(first, RefreshOutcome::Committed(_)));
    assert_eq!(second, RefreshOutcome::Coalesced);
    assert_eq!(transport.call_count(), 8);
    assert_eq!(client.current().revision(), 1);
}

// ============================================================================
// Scheduler, probe and writes
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_scheduler_runs_periodic_cycles() {
    let client = client(RoutedTransport::healthy());
    let mut rx = client.subscribe();
    let handle = client.start();

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().revision(), 1);
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().revision(), 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_stops_on_auth_failure() {
    let transport = RoutedTransport::healthy();
    transport.set("/api/v1/profile", Err(FetchError::Unauthorized { status: 401 }));
    let client = client_with(transport.clone(), &sequential());
    let mut rx = client.subscribe();
    let handle = client.start();

    rx.changed().await.unwrap();
    tokio::time::sleep(Duration::from_secs(3600)).await;

    assert!(handle.is_finished());
    assert_eq!(transport.call_count(), 1);
    handle.shutdown().await;
}

#[tokio::test]
async fn test_health_check_makes_one_profile_call() {
    let transport = RoutedTransport::healthy();
    let client = client(transport.clone());

    assert!(client.health_check().await.is_success());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(transport.calls_to("/api/v1/profile"), 1);
    assert!(!client.current().is_populated());
}

#[tokio::test]
async fn test_health_check_follows_profile_override() {
    let transport = RoutedTransport::healthy();
    transport.set("/api/v2/me", Ok(json!({"id": 7, "name": "Maria"})));
    let mut settings = Settings::default();
    settings.set("endpoint.profile", "/api/v2/me").unwrap();
    let client = client_with(transport.clone(), &settings);

    assert!(client.health_check().await.is_success());
    assert_eq!(transport.calls_to("/api/v2/me"), 1);
    assert_eq!(transport.calls_to("/api/v1/profile"), 0);
}

#[tokio::test]
async fn test_create_transaction_posts_once() {
    let transport = RoutedTransport::healthy();
    transport.set(
        "/api/v1/transactions",
        Ok(json!({"id": 99, "description": "Mercado", "amount": "80.00", "type": "expense"})),
    );
    let client = client(transport.clone());

    let tx = abaco_core::NewTransaction {
        description: "Mercado".to_string(),
        amount: abaco_core::Money::new(rust_decimal_macros::dec!(80.00), abaco_core::Currency::BRL),
        date: chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        kind: abaco_core::TransactionKind::Expense,
        category: Some("groceries".to_string()),
        account_id: None,
    };
    let created = client.create_transaction(&tx).await.unwrap();

    assert_eq!(created.id.as_str(), "99");
    let calls = transport.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::Post);
}
