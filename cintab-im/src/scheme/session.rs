//! Scheme session manager
//!
//! The top-level façade over the whole pipeline: discovers available
//! schemes, drives the load coordinator for the active one, owns the
//! current composition engine, preloads the remaining schemes in the
//! background, and exposes scheme switching.
//!
//! `Ready` transitions arrive on the coordinator's worker thread while
//! switches arrive on the caller's thread, so the current scheme id and
//! engine live behind one mutex. Callers interact through engine proxy
//! methods that degrade to inert results while no engine is ready.

use std::sync::{Arc, Mutex, Weak};

use cintab_engine::CinTable;
use tracing::{debug, info, warn};

use crate::config::settings::SchemeSettings;
use crate::config::Settings;
use crate::core::engine::CompositionEngine;
use crate::scheme::registry::{SchemeMetadata, SchemeRegistry};
use crate::scheme::source::TableSource;
use crate::signal::StateSignal;
use crate::table::coordinator::SOURCE_RETRY_HINT;
use crate::table::{LoadState, TableLoadCoordinator};

/// The observable state of the session
#[derive(Debug, Clone)]
pub enum SessionState {
    /// The active scheme's table is being loaded
    Loading { scheme: String },
    /// The active scheme is ready for composition
    Ready {
        scheme: String,
        table: Arc<CinTable>,
    },
    /// The active scheme needs no table (latin pass-through)
    ReadyNoTable { scheme: String },
    /// The active scheme failed to load
    Error { scheme: String, message: String },
}

impl SessionState {
    /// The scheme id this state belongs to.
    pub fn scheme(&self) -> &str {
        match self {
            Self::Loading { scheme }
            | Self::ReadyNoTable { scheme }
            | Self::Ready { scheme, .. }
            | Self::Error { scheme, .. } => scheme,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::ReadyNoTable { .. })
    }
}

/// Mutable session state: active scheme, discovered schemes, and the
/// engine bound to the active table.
struct Current {
    scheme_id: String,
    available: Vec<SchemeMetadata>,
    engine: Option<CompositionEngine>,
    /// Background preload has been kicked off
    preload_done: bool,
}

struct SessionInner {
    registry: SchemeRegistry,
    source: Box<dyn TableSource>,
    coordinator: TableLoadCoordinator,
    state: StateSignal<SessionState>,
    current: Mutex<Current>,
}

/// Top-level input method session: scheme discovery, loading, and the
/// active composition engine.
pub struct SchemeSessionManager {
    inner: Arc<SessionInner>,
}

impl SchemeSessionManager {
    /// Create a session: discover available schemes, pick the preferred
    /// (or first available) one, and start loading it.
    pub fn new(registry: SchemeRegistry, source: Box<dyn TableSource>, settings: &Settings) -> Self {
        let available = discover(&registry, &settings.schemes, source.as_ref());
        let preferred = &settings.schemes.preferred;
        let scheme_id = if available.iter().any(|m| &m.id == preferred) {
            preferred.clone()
        } else {
            available.first().map(|m| m.id.clone()).unwrap_or_default()
        };
        info!(scheme = %scheme_id, available = available.len(), "session starting");

        let inner = Arc::new(SessionInner {
            registry,
            source,
            coordinator: TableLoadCoordinator::new(),
            state: StateSignal::new(),
            current: Mutex::new(Current {
                scheme_id,
                available,
                engine: None,
                preload_done: false,
            }),
        });

        // Table load transitions arrive here, usually from the worker
        // thread; the listener holds a weak reference so a dropped
        // session doesn't keep itself alive through its coordinator.
        let weak: Weak<SessionInner> = Arc::downgrade(&inner);
        inner.coordinator.state().subscribe(move |load_state| {
            if let Some(inner) = weak.upgrade() {
                on_table_state(&inner, load_state);
            }
        });

        let manager = Self { inner };
        load_current(&manager.inner);
        manager
    }

    /// The session's state signal, for subscription and polling.
    /// Listeners are notified from the worker thread for cold loads and
    /// from the caller's thread for warm (cached) ones.
    pub fn state(&self) -> &StateSignal<SessionState> {
        &self.inner.state
    }

    /// The most recent session state.
    pub fn session_state(&self) -> Option<SessionState> {
        self.inner.state.latest()
    }

    /// The active scheme id.
    pub fn current_scheme_id(&self) -> String {
        self.inner.current.lock().unwrap().scheme_id.clone()
    }

    /// Metadata of the active scheme.
    pub fn current_scheme(&self) -> Option<SchemeMetadata> {
        let id = self.current_scheme_id();
        self.inner.registry.get(&id).cloned()
    }

    /// Schemes available to this session, in rotation order.
    pub fn available_schemes(&self) -> Vec<SchemeMetadata> {
        self.inner.current.lock().unwrap().available.clone()
    }

    /// The active scheme's parsed table, for rendering key labels and
    /// the display name.
    pub fn current_table(&self) -> Option<Arc<CinTable>> {
        let cur = self.inner.current.lock().unwrap();
        cur.engine.as_ref().map(|e| e.table().clone())
    }

    /// Whether a scheme's table is already cached.
    pub fn is_cached(&self, id: &str) -> bool {
        self.inner.coordinator.contains(id)
    }

    /// Switch to the next available scheme in rotation order.
    pub fn switch_to_next(&self) {
        let next = {
            let cur = self.inner.current.lock().unwrap();
            if cur.available.len() <= 1 {
                return;
            }
            let index = cur
                .available
                .iter()
                .position(|m| m.id == cur.scheme_id)
                .unwrap_or(0);
            cur.available[(index + 1) % cur.available.len()].id.clone()
        };
        self.switch_to(&next);
    }

    /// Switch to a scheme by id. No-op when `id` is already active or
    /// not in the available set.
    pub fn switch_to(&self, id: &str) {
        {
            let mut cur = self.inner.current.lock().unwrap();
            if cur.scheme_id == id || !cur.available.iter().any(|m| m.id == id) {
                return;
            }
            debug!(from = %cur.scheme_id, to = id, "switching scheme");
            cur.scheme_id = id.to_string();
            cur.engine = None;
        }
        load_current(&self.inner);
    }

    /// Reload the active scheme, re-reading its table from the source.
    pub fn retry(&self) {
        load_current(&self.inner);
    }

    /// Drop all cached tables. The published state is unaffected; the
    /// active engine keeps its table.
    pub fn clear_cache(&self) {
        self.inner.coordinator.clear_cache();
    }

    // ----- composition engine proxies -----
    //
    // All of these are inert (false / None / empty) while no engine is
    // ready, including for no-table schemes where keystrokes pass
    // through to the host.

    pub fn process_key(&self, key: char) -> bool {
        let mut cur = self.inner.current.lock().unwrap();
        cur.engine.as_mut().is_some_and(|e| e.process_key(key))
    }

    pub fn backspace(&self) -> bool {
        let mut cur = self.inner.current.lock().unwrap();
        cur.engine.as_mut().is_some_and(|e| e.backspace())
    }

    pub fn select_candidate(&self, index: usize) -> Option<char> {
        let mut cur = self.inner.current.lock().unwrap();
        cur.engine.as_mut().and_then(|e| e.select_candidate(index))
    }

    pub fn select_candidate_by_key(&self, key: char) -> Option<char> {
        let mut cur = self.inner.current.lock().unwrap();
        cur.engine
            .as_mut()
            .and_then(|e| e.select_candidate_by_key(key))
    }

    pub fn commit(&self) -> Option<String> {
        let mut cur = self.inner.current.lock().unwrap();
        cur.engine.as_mut().and_then(|e| e.commit())
    }

    pub fn clear(&self) {
        let mut cur = self.inner.current.lock().unwrap();
        if let Some(engine) = cur.engine.as_mut() {
            engine.clear();
        }
    }

    pub fn has_input(&self) -> bool {
        let cur = self.inner.current.lock().unwrap();
        cur.engine.as_ref().is_some_and(|e| e.has_input())
    }

    pub fn has_candidates(&self) -> bool {
        let cur = self.inner.current.lock().unwrap();
        cur.engine.as_ref().is_some_and(|e| e.has_candidates())
    }

    pub fn first_candidate(&self) -> Option<char> {
        let cur = self.inner.current.lock().unwrap();
        cur.engine.as_ref().and_then(|e| e.first_candidate())
    }

    pub fn current_code(&self) -> String {
        let cur = self.inner.current.lock().unwrap();
        cur.engine
            .as_ref()
            .map(|e| e.current_code().to_string())
            .unwrap_or_default()
    }

    pub fn current_candidates(&self) -> Vec<char> {
        let cur = self.inner.current.lock().unwrap();
        cur.engine
            .as_ref()
            .map(|e| e.current_candidates().to_vec())
            .unwrap_or_default()
    }
}

/// Intersect the catalog with schemes whose backing table is actually
/// readable (no-table schemes are always available), then apply the
/// user's enabled set and order. Falls back to the first available
/// scheme, then to the first catalog entry.
fn discover(
    registry: &SchemeRegistry,
    settings: &SchemeSettings,
    source: &dyn TableSource,
) -> Vec<SchemeMetadata> {
    let all_available: Vec<SchemeMetadata> = registry
        .schemes()
        .iter()
        .filter(|m| m.table_file.as_deref().is_none_or(|f| source.available(f)))
        .cloned()
        .collect();

    let mut available: Vec<SchemeMetadata> = settings
        .ordered_enabled(registry)
        .into_iter()
        .filter(|m| all_available.iter().any(|a| a.id == m.id))
        .collect();

    if available.is_empty() {
        available = match all_available.first() {
            Some(first) => vec![first.clone()],
            None => registry.schemes().first().cloned().into_iter().collect(),
        };
    }
    available
}

/// Start loading the active scheme. Never called with the current lock
/// held: a cache hit publishes synchronously on this thread and the
/// state listener needs the lock.
fn load_current(inner: &Arc<SessionInner>) {
    let scheme_id = inner.current.lock().unwrap().scheme_id.clone();
    let Some(meta) = inner.registry.get(&scheme_id).cloned() else {
        inner.state.publish(SessionState::Error {
            scheme: scheme_id.clone(),
            message: format!("unknown scheme '{scheme_id}'"),
        });
        return;
    };

    let Some(file) = meta.table_file else {
        inner.current.lock().unwrap().engine = None;
        inner.state.publish(SessionState::ReadyNoTable { scheme: scheme_id });
        maybe_preload(inner);
        return;
    };

    // On a cache hit the coordinator republishes without looking at the
    // bytes, so skip the source read entirely
    let bytes = if inner.coordinator.contains(&scheme_id) {
        Vec::new()
    } else {
        match inner.source.read(&file) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(scheme = %scheme_id, %file, %err, "table read failed");
                inner.current.lock().unwrap().engine = None;
                inner.state.publish(SessionState::Error {
                    scheme: scheme_id,
                    message: format!(
                        "failed to read table file '{file}': {err}. {SOURCE_RETRY_HINT}"
                    ),
                });
                return;
            }
        }
    };
    inner.coordinator.load(&scheme_id, bytes);
}

/// Map a coordinator transition onto the session: rebuild or drop the
/// engine and republish as a `SessionState` for the scheme that is
/// active right now.
fn on_table_state(inner: &Arc<SessionInner>, load_state: &LoadState) {
    let (session_state, became_ready) = {
        let mut cur = inner.current.lock().unwrap();
        let scheme = cur.scheme_id.clone();
        match load_state {
            LoadState::Loading => {
                cur.engine = None;
                (SessionState::Loading { scheme }, false)
            }
            LoadState::Success(table) => {
                cur.engine = Some(CompositionEngine::new(table.clone()));
                (
                    SessionState::Ready {
                        scheme,
                        table: table.clone(),
                    },
                    true,
                )
            }
            LoadState::Error {
                message,
                retry_hint,
            } => {
                cur.engine = None;
                (
                    SessionState::Error {
                        scheme,
                        message: format!("{message}. {retry_hint}"),
                    },
                    false,
                )
            }
        }
    };
    inner.state.publish(session_state);
    if became_ready {
        maybe_preload(inner);
    }
}

/// Once the active scheme is usable, warm the cache with every other
/// available table-backed scheme, sequentially. Failures are logged and
/// swallowed; such a scheme simply loads lazily on demand later.
fn maybe_preload(inner: &Arc<SessionInner>) {
    let (schemes, active) = {
        let mut cur = inner.current.lock().unwrap();
        if cur.preload_done {
            return;
        }
        cur.preload_done = true;
        (cur.available.clone(), cur.scheme_id.clone())
    };

    for meta in schemes {
        if meta.id == active || inner.coordinator.contains(&meta.id) {
            continue;
        }
        let Some(file) = &meta.table_file else {
            continue;
        };
        match inner.source.read(file) {
            Ok(bytes) => {
                debug!(scheme = %meta.id, "preloading");
                inner.coordinator.preload(&meta.id, bytes);
            }
            Err(err) => warn!(scheme = %meta.id, %err, "preload read failed"),
        }
    }
}
