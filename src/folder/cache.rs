//! Per-folder artifact cache.
//!
//! Maps a [`CacheKey`] to a finished response body. Unbounded by design: no
//! eviction, no TTL. The artifact set is bounded by the distinct (host, URL)
//! pairs requested during the process lifetime, which is acceptable for a
//! development and staging tool. Only production responses are ever stored;
//! concurrent misses for the same key may both recompute and both write, and
//! since writes are idempotent the last write wins.

use dashmap::DashMap;

use super::plan::CacheKey;

/// Cache from request variant to finished response body.
#[derive(Debug, Default)]
pub struct ArtifactCache {
    entries: DashMap<CacheKey, String>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(&self, key: CacheKey, body: String) {
        self.entries.insert(key, body);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
