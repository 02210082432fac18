//! # Usage Summaries
//!
//! Read-only queries over a [`UsageStore`]: the ranked per-application list
//! for one day, plus the formatting helpers front ends use to display it.

use super::store::UsageStore;
use crate::clock::Clock;
use chrono::NaiveDate;
use serde::Serialize;

/// One ranked row of a daily summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    /// Opaque application identifier, e.g. `"Inbox [thunderbird]"`
    pub app_id: String,
    /// Seconds of focus attributed to the application
    pub seconds: f64,
    /// Share of the day's total, in percent
    pub percentage: f64,
}

/// Ranked usage for a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub date: NaiveDate,
    /// Entries sorted by descending seconds, ties by identifier
    pub entries: Vec<SummaryEntry>,
    /// Sum of all entries, floored to `1.0` when nothing was recorded
    pub total_seconds: f64,
}

impl Summary {
    /// Summary of a day with no recorded usage
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
            total_seconds: 1.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The total expressed in hours
    pub fn total_hours(&self) -> f64 {
        self.total_seconds / 3600.0
    }
}

/// Summarize `date`, or the clock's current day when `date` is `None`.
///
/// Pure function of the store contents; it never mutates anything.
pub fn get_summary(store: &UsageStore, date: Option<NaiveDate>, clock: &dyn Clock) -> Summary {
    let date = date.unwrap_or_else(|| clock.now().date_naive());
    store.summary(date)
}

/// Format seconds as `"{h}h {mm}m {ss}s"`, e.g. `"1h 02m 03s"`.
pub fn format_duration(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    format!("{hours}h {minutes:02}m {secs:02}s")
}

/// Format a percentage with one decimal place, e.g. `"42.5%"`.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.1}%")
}
