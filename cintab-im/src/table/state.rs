//! Table load states
//!
//! The externally observable state of one [`TableLoadCoordinator`]:
//! most-recent-state semantics, published through a `StateSignal`.
//!
//! [`TableLoadCoordinator`]: super::TableLoadCoordinator

use std::sync::Arc;

use cintab_engine::CinTable;

/// The current state of a table load
#[derive(Debug, Clone)]
pub enum LoadState {
    /// A parse is in flight on the background worker
    Loading,
    /// The table is parsed and cached
    Success(Arc<CinTable>),
    /// The load failed; `retry_hint` tells the user how to recover
    Error { message: String, retry_hint: String },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The parsed table in the `Success` state
    pub fn table(&self) -> Option<&Arc<CinTable>> {
        match self {
            Self::Success(table) => Some(table),
            _ => None,
        }
    }

    /// The error message in the `Error` state
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}
