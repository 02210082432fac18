//! apptime - tracks which application holds focus and how long
//!
//! This library provides the accounting engine: a sampling loop that asks a
//! focus probe which application is active, attributes elapsed wall-clock
//! time to it in a per-day histogram, persists the histogram with a rolling
//! retention window, and answers ranked summary queries.

pub mod clock;
pub mod config;
pub mod error;
pub mod probe;
pub mod tracker;
pub mod usage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Settings, TrackerConfig};
pub use error::{ProbeError, StorageError};
pub use probe::{FocusProbe, UNKNOWN_APP};
pub use tracker::Tracker;
pub use usage::{Summary, SummaryEntry, UsageFile, UsageStore};
