//! # Focus Probe
//!
//! The boundary to the window system: "which application has input focus
//! right now?"
//!
//! Implementations return an opaque identifier string. The tracker only ever
//! compares identifiers for equality, so the format is a display concern; the
//! shipped probes produce `"{window title} [{process name}]"`.
//!
//! A probe may fail for many mundane reasons (no display, window closing
//! mid-query, helper binary missing). Those failures never reach the
//! sampling loop: [`probe_or_unknown`] maps them to [`UNKNOWN_APP`].

mod xdotool;

pub use xdotool::{xdotool_available, XdotoolProbe};

use crate::error::ProbeError;
use std::time::Duration;
use tracing::debug;

/// Identifier credited when the focused application cannot be determined
pub const UNKNOWN_APP: &str = "Unknown";

/// Default upper bound for a single probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Reports the application that currently holds input focus.
pub trait FocusProbe: Send + Sync {
    /// Identifier of the focused application.
    ///
    /// Implementations must return (or fail) within their own timeout.
    fn active_application(&self) -> Result<String, ProbeError>;
}

/// Query `probe`, substituting [`UNKNOWN_APP`] for any failure.
pub fn probe_or_unknown(probe: &dyn FocusProbe) -> String {
    match probe.active_application() {
        Ok(app) if !app.is_empty() => app,
        Ok(_) => UNKNOWN_APP.to_string(),
        Err(e) => {
            debug!(error = %e, "focus probe failed");
            UNKNOWN_APP.to_string()
        }
    }
}

/// Combine a window title and process name into an application identifier.
///
/// An empty title yields the bare process name.
pub fn app_identifier(window_title: &str, process_name: &str) -> String {
    let title = window_title.trim();
    if title.is_empty() {
        process_name.to_string()
    } else {
        format!("{title} [{process_name}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<&'static str, ()>);

    impl FocusProbe for Fixed {
        fn active_application(&self) -> Result<String, ProbeError> {
            self.0
                .map(str::to_string)
                .map_err(|()| ProbeError::NoActiveWindow)
        }
    }

    #[test]
    fn test_app_identifier() {
        assert_eq!(app_identifier("Inbox", "thunderbird"), "Inbox [thunderbird]");
        assert_eq!(app_identifier("", "thunderbird"), "thunderbird");
        assert_eq!(app_identifier("   ", "code"), "code");
    }

    #[test]
    fn test_probe_or_unknown_passes_through() {
        assert_eq!(probe_or_unknown(&Fixed(Ok("Editor [editor]"))), "Editor [editor]");
    }

    #[test]
    fn test_probe_or_unknown_absorbs_failures() {
        assert_eq!(probe_or_unknown(&Fixed(Err(()))), UNKNOWN_APP);
        assert_eq!(probe_or_unknown(&Fixed(Ok(""))), UNKNOWN_APP);
    }
}
