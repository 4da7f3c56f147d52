//! Query engine tests against both store implementations

use chrono::{DateTime, TimeZone, Utc};
use evlog_core::{EventDraft, EventRecord, Field, FieldValues, FilterConfig, LogLevel, Properties};
use evlog_storage::{
    InMemoryRecordStore, QueryError, RecordStore, RedbRecordStore, RedbStoreConfig, query,
};
use tempfile::TempDir;

fn at(second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 14, 10, 0, second).unwrap()
}

fn record(id: &str, event: &str, level: LogLevel, user: &str, created_at: DateTime<Utc>) -> EventRecord {
    let draft = EventDraft::new(event, level, Properties::new()).unwrap();
    let values = FieldValues::from([(Field::UserId, user), (Field::Model, "test-rig")]);
    EventRecord::assemble(draft, &values, id, created_at)
}

fn seeded(store: &dyn RecordStore, n: u32) {
    for i in 0..n {
        let rec = record(&format!("r{i}"), "tick", LogLevel::Info, "u-1", at(i));
        store.append(&rec).unwrap();
    }
}

fn ids(pages: &[evlog_storage::Page]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|page| page.iter().map(|r| r.id().to_string()).collect())
        .collect()
}

// ============================================================================
// Ordering, cap and pagination
// ============================================================================

#[test]
fn test_five_records_page_size_two() {
    let store = InMemoryRecordStore::new();
    seeded(&store, 5);

    let config = FilterConfig::new().with_events_count(5).with_page_size(2);
    let pages = query(&store, &config).unwrap();

    let sizes: Vec<usize> = pages.iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(
        ids(&pages),
        vec![vec!["r4", "r3"], vec!["r2", "r1"], vec!["r0"]]
    );
    let indexes: Vec<usize> = pages.iter().map(|p| p.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
}

#[test]
fn test_cap_keeps_newest() {
    let store = InMemoryRecordStore::new();
    seeded(&store, 10);

    let config = FilterConfig::new().with_events_count(3);
    let pages = query(&store, &config).unwrap();

    assert_eq!(ids(&pages), vec![vec!["r9", "r8", "r7"]]);
}

#[test]
fn test_events_count_zero_returns_no_pages() {
    let store = InMemoryRecordStore::new();
    seeded(&store, 4);

    let pages = query(&store, &FilterConfig::new().with_events_count(0)).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn test_empty_store_returns_no_pages() {
    let store = InMemoryRecordStore::new();
    let pages = query(&store, &FilterConfig::new().with_page_size(10)).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn test_no_matches_with_single_page_size_returns_no_pages() {
    let store = InMemoryRecordStore::new();
    seeded(&store, 3);

    let config = FilterConfig::new()
        .with_page_size(0)
        .with_filter("event_name", ["never_logged"]);
    assert!(query(&store, &config).unwrap().is_empty());
    assert!(query(&InMemoryRecordStore::new(), &FilterConfig::new().with_page_size(-1)).unwrap().is_empty());
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_unknown_field_fails_without_touching_store() {
    let store = InMemoryRecordStore::new();
    seeded(&store, 3);

    let config = FilterConfig::new()
        .with_filter("log_level", ["info"])
        .with_filter("shoe_size", ["42"]);
    let err = query(&store, &config).unwrap_err();

    assert!(matches!(err, QueryError::UnknownField(name) if name == "shoe_size"));
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn test_unknown_field_rejected_even_with_zero_count() {
    let store = InMemoryRecordStore::new();
    let config = FilterConfig::new()
        .with_events_count(0)
        .with_filter("nonsense", ["x"]);
    assert!(query(&store, &config).is_err());
}

#[test]
fn test_time_window_is_inclusive() {
    let store = InMemoryRecordStore::new();
    store.append(&record("a", "boot", LogLevel::Info, "u-1", at(1))).unwrap();
    store.append(&record("b", "boot", LogLevel::Error, "u-1", at(2))).unwrap();
    store.append(&record("c", "boot", LogLevel::Info, "u-1", at(3))).unwrap();

    let config = FilterConfig::new()
        .with_logs_after(at(2))
        .with_logs_before(at(3))
        .with_filter("log_level", ["info"]);
    let pages = query(&store, &config).unwrap();
    assert_eq!(ids(&pages), vec![vec!["c"]]);

    let config = FilterConfig::new().with_logs_after(at(2)).with_logs_before(at(3));
    let pages = query(&store, &config).unwrap();
    assert_eq!(ids(&pages), vec![vec!["c", "b"]]);
}

#[test]
fn test_equal_timestamps_newest_commit_first() {
    let store = InMemoryRecordStore::new();
    store.append(&record("first", "e", LogLevel::Info, "u-1", at(5))).unwrap();
    store.append(&record("second", "e", LogLevel::Info, "u-1", at(5))).unwrap();
    store.append(&record("older", "e", LogLevel::Info, "u-1", at(4))).unwrap();

    let pages = query(&store, &FilterConfig::new()).unwrap();
    assert_eq!(ids(&pages), vec![vec!["second", "first", "older"]]);
}

#[test]
fn test_values_within_a_filter_are_alternatives() {
    let store = InMemoryRecordStore::new();
    store.append(&record("a", "e", LogLevel::Error, "u-1", at(1))).unwrap();
    store.append(&record("b", "e", LogLevel::Fault, "u-2", at(2))).unwrap();
    store.append(&record("c", "e", LogLevel::Debug, "u-1", at(3))).unwrap();

    let config = FilterConfig::new()
        .with_filter("log_level", ["error", "fault"])
        .with_filter("user_id", ["u-1"]);
    let pages = query(&store, &config).unwrap();
    assert_eq!(ids(&pages), vec![vec!["a"]]);
}

#[test]
fn test_camel_case_field_names_resolve() {
    let store = InMemoryRecordStore::new();
    store.append(&record("a", "login", LogLevel::Info, "u-1", at(1))).unwrap();
    store.append(&record("b", "logout", LogLevel::Info, "u-1", at(2))).unwrap();

    let config = FilterConfig::new().with_filter("eventName", ["login"]);
    let pages = query(&store, &config).unwrap();
    assert_eq!(ids(&pages), vec![vec!["a"]]);
}

// ============================================================================
// Persistent store
// ============================================================================

#[test]
fn test_redb_store_query() {
    let temp_dir = TempDir::new().unwrap();
    let store = RedbRecordStore::open(RedbStoreConfig::with_path(temp_dir.path().join("q.redb"))).unwrap();
    seeded(&store, 5);
    store.append(&record("err", "crash", LogLevel::Error, "u-9", at(30))).unwrap();

    let config = FilterConfig::new().with_events_count(4).with_page_size(3);
    let pages = query(&store, &config).unwrap();
    assert_eq!(ids(&pages), vec![vec!["err", "r4", "r3"], vec!["r2"]]);

    let config = FilterConfig::new().with_filter("model", ["test-rig"]).with_filter("user_id", ["u-9"]);
    let pages = query(&store, &config).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].records[0].event_name(), "crash");
    assert_eq!(pages[0].records[0].rendered_payload(), store.get("err").unwrap().unwrap().rendered_payload());
}
