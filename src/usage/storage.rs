//! # Usage Storage
//!
//! Handles persistent storage of the usage table as a single JSON file.
//!
//! ## Storage Location
//!
//! ```text
//! ~/.local/share/apptime/usage.json
//! ```
//!
//! ## Failure Handling
//!
//! Loading is deliberately forgiving: a missing or unparsable file yields an
//! empty store, and individual entries that are not valid (bad date key,
//! non-numeric or negative seconds) are dropped one by one. Saving writes a
//! sibling `*.tmp` file and renames it over the real one, so an interrupted
//! save leaves the previous file untouched.

use super::store::{UsageStore, DEFAULT_RETENTION_DAYS};
use crate::error::{StorageError, StorageResult};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Date format used for the top-level keys of the usage file
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The durable usage file and its retention policy
#[derive(Debug, Clone)]
pub struct UsageFile {
    path: PathBuf,
    retention_days: i64,
}

impl UsageFile {
    /// Usage file at `path` with the default 7-day retention
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_retention(path, DEFAULT_RETENTION_DAYS)
    }

    pub fn with_retention(path: impl Into<PathBuf>, retention_days: i64) -> Self {
        Self {
            path: path.into(),
            retention_days,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    /// Load the store, falling back to an empty one on any error.
    ///
    /// Days older than the retention window relative to `today` are dropped.
    pub fn load(&self, today: NaiveDate) -> UsageStore {
        match self.try_load(today) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "could not load usage data, starting empty");
                UsageStore::new()
            }
        }
    }

    /// Load the store, reporting I/O and top-level parse errors.
    ///
    /// A missing file is not an error and yields an empty store.
    pub fn try_load(&self, today: NaiveDate) -> StorageResult<UsageStore> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no usage file yet");
            return Ok(UsageStore::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        let raw: Map<String, Value> =
            serde_json::from_str(&content).map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut store = parse_days(raw);
        store.prune_older_than(self.retention_days, today);

        debug!(
            path = %self.path.display(),
            days = store.dates().len(),
            "loaded usage data"
        );
        Ok(store)
    }

    /// Write the store, minus any days outside the retention window.
    ///
    /// The file is replaced atomically; on failure the previous contents are
    /// left as they were.
    pub fn save(&self, store: &UsageStore, today: NaiveDate) -> StorageResult<()> {
        let mut snapshot = store.clone();
        snapshot.prune_older_than(self.retention_days, today);

        let staged = self.stage(&snapshot)?;
        if let Err(source) = fs::rename(&staged, &self.path) {
            let _ = fs::remove_file(&staged);
            return Err(StorageError::Io {
                path: self.path.clone(),
                source,
            });
        }

        debug!(path = %self.path.display(), "saved usage data");
        Ok(())
    }

    /// Serialize `store` into the temporary sibling file and return its path.
    pub(crate) fn stage(&self, store: &UsageStore) -> StorageResult<PathBuf> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(store).map_err(StorageError::Serialize)?;
        let staged = self.staging_path();
        let io_err = |source: std::io::Error| StorageError::Io {
            path: staged.clone(),
            source,
        };

        let mut file = File::create(&staged).map_err(io_err)?;
        let written = file
            .write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(io_err);
        drop(file);

        if let Err(e) = written {
            let _ = fs::remove_file(&staged);
            return Err(e);
        }
        Ok(staged)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| OsString::from("usage.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Build a store from the raw top-level object, skipping anything malformed.
fn parse_days(raw: Map<String, Value>) -> UsageStore {
    let mut store = UsageStore::new();

    for (key, apps) in raw {
        let Ok(date) = NaiveDate::parse_from_str(&key, DATE_FORMAT) else {
            debug!(key = %key, "ignoring non-date key in usage file");
            continue;
        };
        let Value::Object(apps) = apps else {
            debug!(%date, "ignoring non-object day in usage file");
            continue;
        };

        for (app_id, seconds) in apps {
            match seconds.as_f64() {
                Some(s) if s.is_finite() && s >= 0.0 => store.credit(date, &app_id, s),
                _ => debug!(%date, app = %app_id, value = %seconds, "dropping invalid entry"),
            }
        }
    }

    store
}
