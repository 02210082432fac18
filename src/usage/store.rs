//! # Usage Store
//!
//! The in-memory `date -> application -> seconds` table.
//!
//! [`UsageStore`] is the only place usage totals are mutated. It is a plain
//! owned value; the tracker wraps it in a mutex so the sampling thread and
//! callers never observe a half-applied update.

use super::summary::{Summary, SummaryEntry};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Default number of days kept by the retention policy.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// Per-application accumulated seconds for a single day.
pub type DayUsage = BTreeMap<String, f64>;

/// Accumulated focus time, keyed by local calendar day.
///
/// Serializes directly to the on-disk shape:
///
/// ```json
/// { "2024-05-01": { "Mail [mail-client]": 1523.4 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UsageStore {
    days: BTreeMap<NaiveDate, DayUsage>,
}

impl UsageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `seconds` to the running total of `app_id` on `date`.
    pub fn credit(&mut self, date: NaiveDate, app_id: &str, seconds: f64) {
        debug_assert!(
            seconds >= 0.0,
            "negative credit of {seconds}s for {app_id} on {date}"
        );
        if !(seconds.is_finite() && seconds >= 0.0) {
            return;
        }

        let total = self
            .days
            .entry(date)
            .or_default()
            .entry(app_id.to_string())
            .or_insert(0.0);
        *total += seconds;
    }

    /// Ranked summary for `date`.
    ///
    /// Entries are ordered by descending seconds, ties broken by identifier.
    /// The total is floored to `1.0` when nothing was recorded so that
    /// percentages can always be computed.
    pub fn summary(&self, date: NaiveDate) -> Summary {
        let Some(apps) = self.days.get(&date) else {
            return Summary::empty(date);
        };

        let sum: f64 = apps.values().sum();
        let total_seconds = if sum > 0.0 { sum } else { 1.0 };

        let mut entries: Vec<SummaryEntry> = apps
            .iter()
            .map(|(app_id, &seconds)| SummaryEntry {
                app_id: app_id.clone(),
                seconds,
                percentage: seconds / total_seconds * 100.0,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.seconds
                .total_cmp(&a.seconds)
                .then_with(|| a.app_id.cmp(&b.app_id))
        });

        Summary {
            date,
            entries,
            total_seconds,
        }
    }

    /// Remove a whole day. Returns whether it was present.
    pub fn delete_date(&mut self, date: NaiveDate) -> bool {
        self.days.remove(&date).is_some()
    }

    /// Drop every day more than `days` calendar days before `reference`.
    ///
    /// Returns the number of days removed. Days after `reference` are kept.
    pub fn prune_older_than(&mut self, days: i64, reference: NaiveDate) -> usize {
        let before = self.days.len();
        self.days
            .retain(|date, _| reference.signed_duration_since(*date).num_days() <= days);
        let removed = before - self.days.len();
        if removed > 0 {
            debug!(removed, %reference, "pruned days outside retention window");
        }
        removed
    }

    /// All recorded dates in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }

    /// Per-application totals for one day
    pub fn day(&self, date: NaiveDate) -> Option<&DayUsage> {
        self.days.get(&date)
    }

    /// Sum of all seconds recorded on `date` (zero if absent)
    pub fn total_for(&self, date: NaiveDate) -> f64 {
        self.days.get(&date).map_or(0.0, |apps| apps.values().sum())
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn test_credit_accumulates() {
        let mut store = UsageStore::new();
        let day = date("2024-05-01");

        store.credit(day, "Editor [editor]", 10.0);
        store.credit(day, "Editor [editor]", 2.5);
        store.credit(day, "Mail [mail-client]", 4.0);

        let apps = store.day(day).expect("day exists");
        assert_eq!(apps.len(), 2);
        assert!((apps["Editor [editor]"] - 12.5).abs() < f64::EPSILON);
        assert!((store.total_for(day) - 16.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_credit_creates_separate_days() {
        let mut store = UsageStore::new();
        store.credit(date("2024-05-01"), "a", 1.0);
        store.credit(date("2024-05-02"), "a", 1.0);

        assert_eq!(store.dates(), vec![date("2024-05-01"), date("2024-05-02")]);
    }

    #[test]
    fn test_summary_ranks_descending() {
        let mut store = UsageStore::new();
        let day = date("2024-05-01");
        store.credit(day, "small", 1.0);
        store.credit(day, "large", 30.0);
        store.credit(day, "medium", 9.0);

        let summary = store.summary(day);
        let order: Vec<_> = summary.entries.iter().map(|e| e.app_id.as_str()).collect();
        assert_eq!(order, vec!["large", "medium", "small"]);
        assert!((summary.total_seconds - 40.0).abs() < f64::EPSILON);
        assert!((summary.entries[0].percentage - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_ties_break_by_identifier() {
        let mut store = UsageStore::new();
        let day = date("2024-05-01");
        store.credit(day, "Zeta [z]", 5.0);
        store.credit(day, "Alpha [a]", 5.0);

        let summary = store.summary(day);
        assert_eq!(summary.entries[0].app_id, "Alpha [a]");
        assert_eq!(summary.entries[1].app_id, "Zeta [z]");
    }

    #[test]
    fn test_summary_missing_day_is_safe() {
        let store = UsageStore::new();
        let summary = store.summary(date("2024-05-01"));

        assert!(summary.entries.is_empty());
        assert!((summary.total_seconds - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_zero_seconds_has_zero_percentages() {
        let mut store = UsageStore::new();
        let day = date("2024-05-01");
        store.credit(day, "idle", 0.0);

        let summary = store.summary(day);
        assert_eq!(summary.entries.len(), 1);
        assert!((summary.total_seconds - 1.0).abs() < f64::EPSILON);
        assert!(summary.entries[0].percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_date() {
        let mut store = UsageStore::new();
        let day = date("2024-05-01");
        store.credit(day, "a", 3.0);

        assert!(store.delete_date(day));
        assert!(!store.delete_date(day));
        assert!(store.is_empty());
    }

    #[test]
    fn test_prune_older_than() {
        let mut store = UsageStore::new();
        let today = date("2024-05-10");
        store.credit(date("2024-05-01"), "old", 1.0);
        store.credit(date("2024-05-02"), "old", 1.0);
        store.credit(date("2024-05-03"), "edge", 1.0);
        store.credit(today, "new", 1.0);
        store.credit(date("2024-05-11"), "future", 1.0);

        let removed = store.prune_older_than(DEFAULT_RETENTION_DAYS, today);

        assert_eq!(removed, 2);
        assert_eq!(
            store.dates(),
            vec![date("2024-05-03"), today, date("2024-05-11")]
        );
    }

    #[test]
    fn test_serializes_to_date_keyed_map() {
        let mut store = UsageStore::new();
        store.credit(date("2024-05-02"), "Browser [browser]", 4000.0);

        let json = serde_json::to_string(&store).expect("serialize");
        assert_eq!(json, r#"{"2024-05-02":{"Browser [browser]":4000.0}}"#);
    }
}
