//! Table loading: cache, load states, and the background coordinator

pub mod cache;
pub mod coordinator;
pub mod state;

pub use cache::TableCache;
pub use coordinator::TableLoadCoordinator;
pub use state::LoadState;
