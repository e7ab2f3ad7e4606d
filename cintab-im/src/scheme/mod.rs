//! Input schemes: catalog, table sources, and the session manager

pub mod registry;
pub mod session;
pub mod source;

pub use registry::{SchemeMetadata, SchemeRegistry};
pub use session::{SchemeSessionManager, SessionState};
pub use source::{DirTableSource, MemoryTableSource, TableSource};
