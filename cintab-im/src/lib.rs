//! cintab-im: a table-based Chinese input method core
//!
//! This crate drives CIN-table input schemes (Cangjie, Array, Dayi, …):
//! it composes keystrokes into codes, looks up candidates through
//! cintab-engine, loads tables on a background worker with caching and
//! retry, and switches between schemes at runtime.

use std::sync::Once;

pub mod config;
pub mod core;
pub mod scheme;
pub mod signal;
pub mod table;

pub use config::Settings;
pub use crate::core::engine::CompositionEngine;
pub use scheme::registry::{SchemeMetadata, SchemeRegistry};
pub use scheme::session::{SchemeSessionManager, SessionState};
pub use scheme::source::{DirTableSource, MemoryTableSource, TableSource};
pub use signal::StateSignal;
pub use table::{LoadState, TableCache, TableLoadCoordinator};

static INIT_LOGGING: Once = Once::new();

/// Initialize stderr logging for embedders that have no subscriber of
/// their own. Safe to call more than once.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    });
}
