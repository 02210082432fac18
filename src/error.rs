//! Error types for the boundaries where failures are absorbed.
//!
//! Neither of these ever escapes the tracking loop: a [`ProbeError`] becomes
//! the [`UNKNOWN_APP`](crate::probe::UNKNOWN_APP) identifier and a
//! [`StorageError`] becomes an empty store on load or a `false` on save.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to determine the focused application.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("`{command}` exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("`{command}` did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("no window has input focus")]
    NoActiveWindow,

    #[error("unexpected output from `{command}`: {output:?}")]
    InvalidOutput { command: String, output: String },

    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to read or write the durable usage file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize usage data: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
