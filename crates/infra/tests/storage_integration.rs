//! Integration tests for the SQLite key-value store.

use gts_core::KeyValueStore;
use gts_infra::SqliteKeyValueStore;

#[test]
fn round_trips_and_overwrites() {
    let store = SqliteKeyValueStore::in_memory().unwrap();

    store.put("gts-default-calendar", "3").unwrap();
    assert_eq!(store.get("gts-default-calendar").as_deref(), Some("3"));

    store.put("gts-default-calendar", "5").unwrap();
    assert_eq!(store.get("gts-default-calendar").as_deref(), Some("5"));

    store.remove("gts-default-calendar");
    assert_eq!(store.get("gts-default-calendar"), None);
}

#[test]
fn prefix_scan_only_matches_the_namespace() {
    let store = SqliteKeyValueStore::in_memory().unwrap();

    store.put("cal-events-cache:2025-01-01:2025-01-31:1::", "{}").unwrap();
    store.put("cal-events-cache:2025-02-01:2025-02-28:1::", "{}").unwrap();
    store.put("gts-selected-calendars", "[\"1\"]").unwrap();

    let mut keys = store.keys_with_prefix("cal-events-cache");
    keys.sort();
    assert_eq!(keys.len(), 2);
    assert!(keys[0].starts_with("cal-events-cache:2025-01-01"));
}

#[test]
fn values_survive_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("client.sqlite");

    {
        let store = SqliteKeyValueStore::open(&path).unwrap();
        store.put("gts-calendar-filters", r#"{"status":"completed"}"#).unwrap();
    }

    let reopened = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("gts-calendar-filters").as_deref(),
        Some(r#"{"status":"completed"}"#)
    );
}

#[test]
fn missing_keys_read_as_none() {
    let store = SqliteKeyValueStore::in_memory().unwrap();
    assert_eq!(store.get("never-written"), None);
    assert!(store.keys_with_prefix("cal-events-cache").is_empty());
}
