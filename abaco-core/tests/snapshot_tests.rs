//! Integration tests for snapshot types.

use std::collections::BTreeMap;

use abaco_core::{
    Category, CategoryData, CategoryEntry, Currency, CycleOutcome, ErrorKind, ExternalId, Money,
    NetWorthSummary, Profile, Record, Snapshot,
};
use chrono::Utc;
use rust_decimal_macros::dec;

fn profile() -> Record {
    Record::Profile(Profile {
        id: ExternalId::new("profile"),
        name: Some("Maria".to_string()),
        email: None,
        default_currency: Currency::BRL,
    })
}

fn net_worth() -> Record {
    Record::NetWorthSummary(NetWorthSummary {
        id: ExternalId::new("net_worth_summary"),
        total_value: Money::new(dec!(250000), Currency::BRL),
        total_assets: Money::zero(Currency::BRL),
        total_liabilities: Money::zero(Currency::BRL),
        item_count: Some(3),
    })
}

#[test]
fn test_snapshot_singleton_accessors() {
    let now = Utc::now();
    let mut categories = BTreeMap::new();
    categories.insert(
        Category::Profile,
        CategoryEntry::ok(CategoryData::new(vec![profile()]), now),
    );
    categories.insert(
        Category::NetWorthSummary,
        CategoryEntry::ok(CategoryData::new(vec![net_worth()]), now),
    );
    let snapshot = Snapshot::new(1, now, CycleOutcome::Complete, categories);

    assert!(snapshot.is_populated());
    assert_eq!(snapshot.profile().unwrap().name.as_deref(), Some("Maria"));
    assert_eq!(
        snapshot.net_worth_summary().unwrap().total_value.amount,
        dec!(250000)
    );
}

#[test]
fn test_partial_snapshot_reports_stale_records() {
    let earlier = Utc::now();
    let previous = CategoryEntry::ok(CategoryData::new(vec![net_worth()]), earlier);

    let mut categories = BTreeMap::new();
    categories.insert(
        Category::Profile,
        CategoryEntry::ok(CategoryData::new(vec![profile()]), Utc::now()),
    );
    categories.insert(
        Category::NetWorthSummary,
        CategoryEntry::failed(Some(&previous), "server error (503)", ErrorKind::Transient),
    );
    let snapshot = Snapshot::new(
        2,
        Utc::now(),
        CycleOutcome::Partial {
            failed: vec![Category::NetWorthSummary],
        },
        categories,
    );

    let view = snapshot
        .record(Category::NetWorthSummary, "net_worth_summary")
        .unwrap();
    assert!(view.is_stale());
    assert_eq!(view.last_success, Some(earlier));
    assert!(!snapshot.record(Category::Profile, "profile").unwrap().is_stale());
    assert!(!snapshot.needs_reauth());
}

#[test]
fn test_snapshot_serializes_entries_by_category() {
    let now = Utc::now();
    let mut categories = BTreeMap::new();
    categories.insert(
        Category::Accounts,
        CategoryEntry::failed(None, "timeout", ErrorKind::Transient),
    );
    let snapshot = Snapshot::new(1, now, CycleOutcome::AuthFailed, categories);

    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["revision"], 1);
    assert_eq!(value["outcome"]["outcome"], "auth_failed");
    assert_eq!(value["categories"]["accounts"]["status"]["state"], "failed");
    assert_eq!(value["categories"]["accounts"]["error_kind"], "transient");
}
