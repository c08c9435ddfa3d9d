use crate::query::DynamicQuery;
use std::sync::Arc;
use tracing::debug;

struct CacheEntry {
    query: Arc<DynamicQuery>,
    key: Option<String>,
}

/// In-memory store of reusable dynamic queries.
///
/// Entries live until removed or cleared. There is no internal locking:
/// share it behind a mutex if several tasks need to mutate it.
#[derive(Default)]
pub struct QueryCache {
    entries: Vec<CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query. Adding the same query twice creates two entries.
    pub fn add(&mut self, query: Arc<DynamicQuery>, key: Option<String>) {
        debug!("Caching dynamic query (key: {:?})", key);
        self.entries.push(CacheEntry { query, key });
    }

    /// Remove the first entry holding this exact query instance
    pub fn remove(&mut self, query: &Arc<DynamicQuery>) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.query, query))
        {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        debug!("Clearing {} cached queries", self.entries.len());
        self.entries.clear();
    }

    /// Cached queries in insertion order
    pub fn queries(&self) -> impl Iterator<Item = &Arc<DynamicQuery>> + '_ {
        self.entries.iter().map(|entry| &entry.query)
    }

    /// First query added under `key`
    pub fn find_by_key(&self, key: &str) -> Option<&Arc<DynamicQuery>> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
            .map(|entry| &entry.query)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
