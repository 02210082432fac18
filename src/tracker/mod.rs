//! # Tracker
//!
//! The consumer-facing engine: owns the usage store, runs the sampling loop
//! on a dedicated thread, and answers queries from any other thread.
//!
//! ## Threading
//!
//! The store and the sampler position live behind one mutex. The focus probe
//! runs *outside* that lock so a slow probe never blocks queries. Saves are
//! additionally serialized by their own lock so two concurrent saves cannot
//! write their snapshots out of order.
//!
//! ## Lifecycle
//!
//! ```text
//! new()   load usage file (retention applied)
//! start() spawn sampler thread; no-op if already running
//! stop()  signal + join the thread, credit the last open interval, save
//! ```

mod sampler;

pub use sampler::{elapsed_seconds, Sampler};

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::error::StorageResult;
use crate::probe::{probe_or_unknown, FocusProbe, XdotoolProbe};
use crate::usage::{get_summary, Summary, UsageFile, UsageStore};
use chrono::NaiveDate;
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

struct State {
    store: UsageStore,
    sampler: Sampler,
}

/// State shared between the caller and the sampler thread
struct Shared {
    state: Mutex<State>,
    save_lock: Mutex<()>,
    file: UsageFile,
    probe: Arc<dyn FocusProbe>,
    clock: Arc<dyn Clock>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) {
        let current_app = probe_or_unknown(self.probe.as_ref());

        // Read the clock under the lock so a concurrent close-out can never
        // land between this reading and the observation.
        let mut state = self.lock_state();
        let now = self.clock.now();
        let State { store, sampler } = &mut *state;
        sampler.observe(store, current_app, now);
    }

    fn save(&self) -> StorageResult<()> {
        let _serial = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (snapshot, today) = {
            let mut state = self.lock_state();
            let now = self.clock.now();
            let today = now.date_naive();
            let State { store, sampler } = &mut *state;
            sampler.close_out(store, now);
            store.prune_older_than(self.file.retention_days(), today);
            (store.clone(), today)
        };

        self.file.save(&snapshot, today)
    }

    fn save_logged(&self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to save usage data");
                false
            }
        }
    }
}

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Focus-time tracker over a durable usage file.
pub struct Tracker {
    shared: Arc<Shared>,
    tick_interval: Duration,
    autosave_interval: Option<Duration>,
    worker: Mutex<Option<Worker>>,
}

impl Tracker {
    /// Create a tracker, loading existing usage from `config.data_file`.
    ///
    /// A missing or corrupt file yields an empty store.
    pub fn new(
        config: &TrackerConfig,
        probe: Arc<dyn FocusProbe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let file = UsageFile::with_retention(&config.data_file, config.retention_days);
        let store = file.load(clock.now().date_naive());

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    store,
                    sampler: Sampler::new(),
                }),
                save_lock: Mutex::new(()),
                file,
                probe,
                clock,
            }),
            tick_interval: config.tick_interval,
            autosave_interval: config.autosave_interval,
            worker: Mutex::new(None),
        }
    }

    /// Tracker using the xdotool probe and the system clock
    pub fn with_system_probe(config: &TrackerConfig) -> Self {
        Self::new(
            config,
            Arc::new(XdotoolProbe::new(config.probe_timeout)),
            Arc::new(SystemClock),
        )
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the sampling thread.
    ///
    /// Returns `Ok(false)` if it was already running.
    pub fn start(&self) -> io::Result<bool> {
        let mut worker = self.lock_worker();
        if worker.is_some() {
            return Ok(false);
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let tick_interval = self.tick_interval;
        let autosave_interval = self.autosave_interval;

        let handle = thread::Builder::new()
            .name("apptime-sampler".into())
            .spawn(move || run_loop(&shared, &stop_rx, tick_interval, autosave_interval))?;

        *worker = Some(Worker { stop_tx, handle });
        info!(interval = ?tick_interval, "tracking started");
        Ok(true)
    }

    /// Stop sampling, credit the final partial interval, and save.
    ///
    /// Blocks until the sampler thread has exited. Returns whether the save
    /// succeeded; in-memory data is kept either way so a retry is possible.
    pub fn stop(&self) -> bool {
        let worker = self.lock_worker().take();

        if let Some(Worker { stop_tx, handle }) = worker {
            let _ = stop_tx.send(());
            if handle.join().is_err() {
                error!("sampler thread panicked");
            }

            let mut state = self.shared.lock_state();
            let now = self.shared.clock.now();
            let State { store, sampler } = &mut *state;
            sampler.close_out(store, now);
            sampler.reset();
            info!("tracking stopped");
        }

        self.shared.save_logged()
    }

    pub fn is_running(&self) -> bool {
        self.lock_worker().is_some()
    }

    /// Take one sample immediately.
    ///
    /// The background loop calls this once per interval; front ends and
    /// tests may also drive it directly.
    pub fn tick(&self) {
        self.shared.tick();
    }

    /// Ranked summary for `date`, or for today when `None`.
    pub fn get_summary(&self, date: Option<NaiveDate>) -> Summary {
        let state = self.shared.lock_state();
        get_summary(&state.store, date, self.shared.clock.as_ref())
    }

    /// Delete all usage for `date` and persist the change.
    ///
    /// Returns `false` if the date had no data. The save closes out the open
    /// interval first, so deleting today while tracking leaves today holding
    /// the seconds since the last tick.
    pub fn delete_date(&self, date: NaiveDate) -> bool {
        let removed = self.shared.lock_state().store.delete_date(date);
        if removed {
            info!(%date, "deleted usage for date");
            if !self.shared.save_logged() {
                warn!(%date, "deletion is not yet durable");
            }
        }
        removed
    }

    /// Dates with recorded usage, oldest first
    pub fn list_dates(&self) -> Vec<NaiveDate> {
        self.shared.lock_state().store.dates()
    }

    /// Save now, returning whether the write succeeded.
    pub fn save_now(&self) -> bool {
        self.shared.save_logged()
    }

    /// Save now, returning the failure.
    pub fn try_save(&self) -> StorageResult<()> {
        self.shared.save()
    }

    /// Copy of the current store contents
    pub fn snapshot(&self) -> UsageStore {
        self.shared.lock_state().store.clone()
    }

    pub fn data_file(&self) -> &Path {
        self.shared.file.path()
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

fn run_loop(
    shared: &Shared,
    stop_rx: &mpsc::Receiver<()>,
    tick_interval: Duration,
    autosave_interval: Option<Duration>,
) {
    let mut last_save = Instant::now();

    loop {
        shared.tick();

        if let Some(every) = autosave_interval {
            if last_save.elapsed() >= every {
                debug!("periodic save");
                shared.save_logged();
                last_save = Instant::now();
            }
        }

        match stop_rx.recv_timeout(tick_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
