//! The attribution rule.
//!
//! The interval between two observations belongs to the application seen at
//! the *start* of the interval: when a new observation arrives, the time since
//! the previous one is credited to the previously observed application, on
//! the calendar day the interval started. The new observation only becomes
//! "current" going forward.

use crate::usage::UsageStore;
use chrono::{DateTime, Local};
use tracing::trace;

/// Position of the sampling loop: the last application seen and when.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    last: Option<(String, DateTime<Local>)>,
}

impl Sampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The application observed by the most recent tick
    pub fn last_app(&self) -> Option<&str> {
        self.last.as_ref().map(|(app, _)| app.as_str())
    }

    /// Record that `current_app` is focused at `now`.
    ///
    /// Credits the interval since the previous observation to the previously
    /// observed application and returns the seconds credited.
    pub fn observe(
        &mut self,
        store: &mut UsageStore,
        current_app: String,
        now: DateTime<Local>,
    ) -> f64 {
        let credited = self.credit_open_interval(store, now);
        self.last = Some((current_app, now));
        credited
    }

    /// Credit the open interval up to `now` without a new observation.
    ///
    /// The interval start moves to `now`, so a later [`observe`](Self::observe)
    /// does not credit the same time twice.
    pub fn close_out(&mut self, store: &mut UsageStore, now: DateTime<Local>) -> f64 {
        let credited = self.credit_open_interval(store, now);
        if let Some((_, since)) = self.last.as_mut() {
            *since = now;
        }
        credited
    }

    /// Forget the current position; the next observation starts fresh.
    pub fn reset(&mut self) {
        self.last = None;
    }

    fn credit_open_interval(&self, store: &mut UsageStore, now: DateTime<Local>) -> f64 {
        let Some((app, since)) = self.last.as_ref() else {
            return 0.0;
        };

        let seconds = elapsed_seconds(*since, now);
        if seconds > 0.0 {
            store.credit(since.date_naive(), app, seconds);
            trace!(app = %app, seconds, "credited interval");
        }
        seconds
    }
}

/// Seconds from `from` to `to`, or zero if the clock went backwards.
pub fn elapsed_seconds(from: DateTime<Local>, to: DateTime<Local>) -> f64 {
    let millis = to.signed_duration_since(from).num_milliseconds();
    if millis > 0 {
        millis as f64 / 1000.0
    } else {
        0.0
    }
}
