//! Background table load coordinator
//!
//! One dedicated worker thread per coordinator serializes all parse
//! operations. `load` and `retry` never block: they record the request
//! and return, and the worker publishes `Loading → Success/Error`
//! transitions through the coordinator's [`StateSignal`]. A cache hit
//! publishes `Success` synchronously on the caller's thread without
//! consulting the worker.
//!
//! There is no cancellation: an in-flight parse can only be superseded
//! by a later request, whose result overwrites the observable state.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use cintab_engine::{CinError, CinTable};
use tracing::{debug, warn};

use super::cache::TableCache;
use super::state::LoadState;
use crate::signal::StateSignal;

/// Retry hint for tables that fail to parse.
pub const FORMAT_RETRY_HINT: &str =
    "Check that the file is a valid CIN table with a %chardef section, then retry.";

/// Retry hint for table bytes that cannot be read or decoded.
pub const SOURCE_RETRY_HINT: &str =
    "Check that the table file exists and is readable, then retry.";

/// A request for the worker thread.
enum Job {
    /// Parse and publish the resulting state
    Load { key: String, bytes: Vec<u8> },
    /// Parse into the cache only; failures are logged and swallowed
    Preload { key: String, bytes: Vec<u8> },
}

/// Why a table failed to load. Format errors are recoverable by fixing
/// the table text; decode errors by fixing the source.
#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("table format error: {0}")]
    Format(#[from] CinError),

    #[error("table is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

impl LoadError {
    fn retry_hint(&self) -> &'static str {
        match self {
            Self::Format(_) => FORMAT_RETRY_HINT,
            Self::Decode(_) => SOURCE_RETRY_HINT,
        }
    }
}

/// Coordinates background parsing of raw table bytes into the cache.
pub struct TableLoadCoordinator {
    jobs: Sender<Job>,
    state: Arc<StateSignal<LoadState>>,
    cache: Arc<Mutex<TableCache>>,
    last_request: Mutex<Option<(String, Vec<u8>)>>,
}

impl TableLoadCoordinator {
    /// Create a coordinator and spawn its worker thread. The worker
    /// exits when the coordinator is dropped.
    pub fn new() -> Self {
        let (jobs, rx) = mpsc::channel::<Job>();
        let state = Arc::new(StateSignal::new());
        let cache = Arc::new(Mutex::new(TableCache::new()));

        let worker_state = state.clone();
        let worker_cache = cache.clone();
        thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                run_job(job, &worker_cache, &worker_state);
            }
            debug!("table loader worker exiting");
        });

        Self {
            jobs,
            state,
            cache,
            last_request: Mutex::new(None),
        }
    }

    /// The coordinator's state signal, for subscription and polling.
    /// Listeners are notified from the worker thread (or from the
    /// caller's thread on a cache hit).
    pub fn state(&self) -> &StateSignal<LoadState> {
        &self.state
    }

    /// Load a table from raw bytes under a scheme key.
    ///
    /// On a cache hit the cached table is republished immediately,
    /// without reparsing and without looking at `bytes` (callers may
    /// pass a placeholder); otherwise the request is recorded for
    /// [`retry`](Self::retry) and `Loading` is published before the
    /// parse runs on the worker.
    pub fn load(&self, key: &str, bytes: Vec<u8>) {
        if let Some(table) = self.cache.lock().unwrap().get(key) {
            debug!(key, "cache hit, republishing");
            self.state.publish(LoadState::Success(table));
            return;
        }

        *self.last_request.lock().unwrap() = Some((key.to_string(), bytes.clone()));
        self.state.publish(LoadState::Loading);
        if self
            .jobs
            .send(Job::Load {
                key: key.to_string(),
                bytes,
            })
            .is_err()
        {
            warn!(key, "table loader worker is gone, load dropped");
        }
    }

    /// Parse a table into the cache without publishing state changes.
    /// Used for background preloading; failures are swallowed and the
    /// scheme is loaded lazily on demand later.
    pub fn preload(&self, key: &str, bytes: Vec<u8>) {
        if self.cache.lock().unwrap().contains(key) {
            return;
        }
        if self
            .jobs
            .send(Job::Preload {
                key: key.to_string(),
                bytes,
            })
            .is_err()
        {
            warn!(key, "table loader worker is gone, preload dropped");
        }
    }

    /// Replay the last recorded request unchanged. The same bytes are
    /// reparsed, so a retry against an unchanged bad table reproduces
    /// the same error; re-reading the original source is the caller's
    /// concern.
    pub fn retry(&self) {
        let last = self.last_request.lock().unwrap().clone();
        match last {
            Some((key, bytes)) => self.load(&key, bytes),
            None => debug!("retry with no recorded request, ignoring"),
        }
    }

    /// A cached table, if present.
    pub fn cached(&self, key: &str) -> Option<Arc<CinTable>> {
        self.cache.lock().unwrap().get(key)
    }

    /// Whether a key is cached.
    pub fn contains(&self, key: &str) -> bool {
        self.cache.lock().unwrap().contains(key)
    }

    /// Drop all cached tables. The currently published state is
    /// unaffected.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }
}

impl Default for TableLoadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bytes(bytes: &[u8]) -> Result<CinTable, LoadError> {
    let text = std::str::from_utf8(bytes)?;
    Ok(cintab_engine::parse(text)?)
}

fn run_job(job: Job, cache: &Mutex<TableCache>, state: &StateSignal<LoadState>) {
    match job {
        Job::Load { key, bytes } => match parse_bytes(&bytes) {
            Ok(table) => {
                let table = Arc::new(table);
                cache.lock().unwrap().put(&key, table.clone());
                debug!(key, chars = table.total_chars(), "table loaded");
                state.publish(LoadState::Success(table));
            }
            Err(err) => {
                warn!(key, %err, "table load failed");
                state.publish(LoadState::Error {
                    message: err.to_string(),
                    retry_hint: err.retry_hint().to_string(),
                });
            }
        },
        Job::Preload { key, bytes } => match parse_bytes(&bytes) {
            Ok(table) => {
                debug!(key, chars = table.total_chars(), "table preloaded");
                cache.lock().unwrap().put(&key, Arc::new(table));
            }
            Err(err) => {
                // Preload failures don't surface; the scheme loads
                // lazily when the user switches to it
                warn!(key, %err, "table preload failed");
            }
        },
    }
}
