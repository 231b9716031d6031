//! Result cache owned by and injected into each executor instance.
//!
//! Entries are keyed by `(endpoint identity, query text)` and live for
//! the cache's lifetime; there is no TTL. Values are deterministic for
//! a given key, so two identical in-flight requests writing the same
//! entry is a benign race.

use std::collections::HashMap;
use std::sync::Mutex;

pub struct QueryCache<V> {
    entries: Mutex<HashMap<(String, String), V>>,
    capacity: Option<usize>,
}

impl<V: Clone> QueryCache<V> {
    /// An unbounded cache
    pub fn new() -> Self {
        QueryCache { entries: Mutex::new(HashMap::new()), capacity: None }
    }

    /// A cache that stops accepting new keys once `capacity` entries
    /// are held; existing keys keep being served
    pub fn with_capacity_limit(capacity: usize) -> Self {
        QueryCache { entries: Mutex::new(HashMap::new()), capacity: Some(capacity) }
    }

    pub fn get(&self, endpoint: &str, query: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap();
        entries.get(&(endpoint.to_string(), query.to_string())).cloned()
    }

    pub fn insert(&self, endpoint: &str, query: &str, value: V) {
        let mut entries = self.entries.lock().unwrap();
        let key = (endpoint.to_string(), query.to_string());
        if let Some(capacity) = self.capacity {
            if entries.len() >= capacity && !entries.contains_key(&key) {
                return;
            }
        }
        entries.insert(key, value);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        QueryCache::new()
    }
}
