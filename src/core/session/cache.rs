//! Per-session memo tables keyed by `DocumentKey`.

use std::collections::HashMap;

use crate::ingestion::DocumentKey;

/// Key-value store holding one derived value per loaded document.
#[derive(Debug, Clone)]
pub struct DocumentCache<V> {
    entries: HashMap<DocumentKey, V>,
    hits: u64,
    misses: u64,
}

impl<V> Default for DocumentCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }
}

impl<V> DocumentCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DocumentKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &DocumentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: DocumentKey, value: V) {
        self.misses += 1;
        self.entries.insert(key, value);
    }

    /// Return the cached value for `key`, computing it with `compute` on a miss.
    pub fn get_or_insert_with(&mut self, key: DocumentKey, compute: impl FnOnce() -> V) -> &V {
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.entries.entry(key).or_insert_with(compute)
    }

    /// Record a lookup that was served from the cache.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn remove(&mut self, key: &DocumentKey) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
