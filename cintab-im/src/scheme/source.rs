//! Table byte sources
//!
//! The session manager does not care where table bytes come from; a
//! `TableSource` abstracts over the file system, packaged assets, or
//! in-memory fixtures. The core only ever sees raw bytes.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Supplier of raw table bytes, keyed by table file name.
pub trait TableSource: Send + Sync {
    /// Whether the named table can be read at all.
    fn available(&self, file_name: &str) -> bool;

    /// Read the named table's raw bytes.
    fn read(&self, file_name: &str) -> io::Result<Vec<u8>>;
}

/// Tables stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirTableSource {
    root: PathBuf,
}

impl DirTableSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TableSource for DirTableSource {
    fn available(&self, file_name: &str) -> bool {
        self.root.join(file_name).is_file()
    }

    fn read(&self, file_name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(file_name))
    }
}

/// In-memory tables, mainly for tests and embedded fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSource {
    tables: HashMap<String, Vec<u8>>,
}

impl MemoryTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.tables.insert(file_name.into(), bytes.into());
    }

    pub fn with(mut self, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(file_name, bytes);
        self
    }
}

impl TableSource for MemoryTableSource {
    fn available(&self, file_name: &str) -> bool {
        self.tables.contains_key(file_name)
    }

    fn read(&self, file_name: &str) -> io::Result<Vec<u8>> {
        self.tables.get(file_name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such table: {file_name}"))
        })
    }
}
