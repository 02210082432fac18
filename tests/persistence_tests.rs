//! Usage file persistence tests
//!
//! Exercise the on-disk format through the public API: retention, lenient
//! loading, and atomic replacement.

use apptime::usage::DATE_FORMAT;
use apptime::{UsageFile, UsageStore};
use chrono::{Duration, Local, NaiveDate};
use std::fs;
use tempfile::TempDir;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Store with one app per day for the last `days` days, today included
fn store_spanning(days: i64) -> UsageStore {
    let mut store = UsageStore::new();
    for offset in 0..days {
        let date = today() - Duration::days(offset);
        store.credit(date, "Editor [editor]", 60.0 * (offset + 1) as f64);
    }
    store
}

#[test]
fn test_save_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file = UsageFile::new(temp_dir.path().join("usage.json"));

    let mut store = UsageStore::new();
    store.credit(today(), "Mail [mail-client]", 12.5);
    store.credit(today(), "Editor [editor]", 30.0);
    store.credit(today() - Duration::days(2), "Browser [browser]", 7.25);
    file.save(&store, today()).unwrap();

    let loaded = file.try_load(today()).unwrap();
    assert_eq!(loaded, store);
}

#[test]
fn test_retention_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let file = UsageFile::new(temp_dir.path().join("usage.json"));
    file.save(&store_spanning(12), today()).unwrap();

    let first = file.load(today());
    file.save(&first, today()).unwrap();
    let bytes_once = fs::read(file.path()).unwrap();

    let second = file.load(today());
    file.save(&second, today()).unwrap();
    let bytes_twice = fs::read(file.path()).unwrap();

    assert_eq!(bytes_once, bytes_twice);
    assert_eq!(first, second);
}

#[test]
fn test_retention_window_boundary() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("usage.json");

    let kept = today() - Duration::days(7);
    let dropped = today() - Duration::days(8);
    let future = today() + Duration::days(1);
    let json = format!(
        r#"{{"{}": {{"A": 1.0}}, "{}": {{"B": 2.0}}, "{}": {{"C": 3.0}}}}"#,
        key(kept),
        key(dropped),
        key(future)
    );
    fs::write(&path, json).unwrap();

    let store = UsageFile::new(&path).load(today());
    assert_eq!(store.dates(), vec![kept, future]);
}

#[test]
fn test_leftover_staging_file_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("usage.json");
    let file = UsageFile::new(&path);

    let mut store = UsageStore::new();
    store.credit(today(), "Editor [editor]", 90.0);
    file.save(&store, today()).unwrap();

    // A crash mid-save leaves a partial staging file behind.
    fs::write(temp_dir.path().join("usage.json.tmp"), r#"{"2024-"#).unwrap();

    let loaded = file.try_load(today()).unwrap();
    assert_eq!(loaded, store);

    store.credit(today(), "Editor [editor]", 10.0);
    file.save(&store, today()).unwrap();
    assert!((file.load(today()).total_for(today()) - 100.0).abs() < f64::EPSILON);
    assert!(!temp_dir.path().join("usage.json.tmp").exists());
}

#[test]
fn test_invalid_entries_are_dropped_individually() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("usage.json");
    let json = format!(
        r#"{{
            "not-a-date": {{"A": 5.0}},
            "{today}": {{"Good": 4.0, "Negative": -3.0, "Text": "ten", "Null": null}},
            "{yesterday}": [1, 2, 3]
        }}"#,
        today = key(today()),
        yesterday = key(today() - Duration::days(1)),
    );
    fs::write(&path, json).unwrap();

    let store = UsageFile::new(&path).load(today());
    assert_eq!(store.dates(), vec![today()]);
    let day = store.day(today()).unwrap();
    assert_eq!(day.len(), 1);
    assert!((day["Good"] - 4.0).abs() < f64::EPSILON);
}

#[test]
fn test_unreadable_json_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("usage.json");
    fs::write(&path, "[\"not\", \"an\", \"object\"]").unwrap();

    let file = UsageFile::new(&path);
    assert!(file.try_load(today()).is_err());
    assert!(file.load(today()).is_empty());
}
