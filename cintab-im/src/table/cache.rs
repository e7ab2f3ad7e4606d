//! In-memory cache of parsed tables, keyed by scheme id

use std::collections::HashMap;
use std::sync::Arc;

use cintab_engine::CinTable;

/// Parsed-table cache. Plain map; the coordinator provides the locking.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<String, Arc<CinTable>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a parsed table under a scheme key.
    pub fn put(&mut self, key: impl Into<String>, table: Arc<CinTable>) {
        self.entries.insert(key.into(), table);
    }

    /// Fetch a cached table.
    pub fn get(&self, key: &str) -> Option<Arc<CinTable>> {
        self.entries.get(key).cloned()
    }

    /// Drop a single cached table.
    pub fn remove(&mut self, key: &str) -> Option<Arc<CinTable>> {
        self.entries.remove(key)
    }

    /// Drop all cached tables.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cintab_engine::parse;

    fn table() -> Arc<CinTable> {
        Arc::new(parse("%chardef begin\na 日\n%chardef end\n").unwrap())
    }

    #[test]
    fn test_put_get_remove() {
        let mut cache = TableCache::new();
        assert!(cache.get("cangjie").is_none());

        cache.put("cangjie", table());
        assert!(cache.contains("cangjie"));
        assert_eq!(cache.get("cangjie").unwrap().total_chars(), 1);

        cache.remove("cangjie");
        assert!(!cache.contains("cangjie"));
    }

    #[test]
    fn test_clear() {
        let mut cache = TableCache::new();
        cache.put("a", table());
        cache.put("b", table());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let mut cache = TableCache::new();
        let first = table();
        cache.put("a", first.clone());
        let second = table();
        cache.put("a", second.clone());
        assert!(Arc::ptr_eq(&cache.get("a").unwrap(), &second));
    }
}
