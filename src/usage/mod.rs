//! # Usage Accounting Module
//!
//! This module owns the per-day histogram of focus time per application.
//!
//! ## Overview
//!
//! - [`UsageStore`]: the in-memory `date -> app -> seconds` table with the
//!   crediting, ranking, deletion and retention rules.
//! - [`UsageFile`]: loads and saves the store as JSON, applying the retention
//!   window on both paths.
//! - [`get_summary`]: ranked view of one day for display.
//!
//! ## Storage
//!
//! Usage data is stored in XDG-compliant locations:
//! - Linux: `~/.local/share/apptime/usage.json`
//! - macOS: `~/Library/Application Support/apptime/usage.json`
//! - Windows: `%APPDATA%\apptime\data\usage.json`
//!
//! ## Data Format
//!
//! ```json
//! {
//!   "2024-05-01": { "Mail [mail-client]": 1523.4, "Editor [editor]": 9021.8 },
//!   "2024-05-02": { "Browser [browser]": 4000.0 }
//! }
//! ```

mod storage;
mod store;
mod summary;

pub use storage::{UsageFile, DATE_FORMAT};
pub use store::{DayUsage, UsageStore, DEFAULT_RETENTION_DAYS};
pub use summary::{format_duration, format_percentage, get_summary, Summary, SummaryEntry};
