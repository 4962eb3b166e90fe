//! Caching utilities for detection.

use moka::sync::Cache;
use std::hash::Hash;
use std::time::Duration;

/// Generic bounded TTL cache.
///
/// Synchronous: it sits on the per-event detector path, which must never
/// await.
pub struct DetectionCache<K, V>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
    name: String,
}

impl<K, V> DetectionCache<K, V>
where
    K: Hash + Eq + Send + Sync + Clone + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache with the given parameters.
    pub fn new(name: impl Into<String>, max_capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            inner,
            name: name.into(),
        }
    }

    /// Get a value from the cache.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Insert a value into the cache.
    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Get the current entry count.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Get the cache name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invalidate all entries.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic() {
        let cache: DetectionCache<String, bool> =
            DetectionCache::new("test", 100, Duration::from_secs(60));

        cache.insert("button#go".to_string(), true);

        assert_eq!(cache.get(&"button#go".to_string()), Some(true));
        assert_eq!(cache.get(&"missing".to_string()), None);
        assert_eq!(cache.name(), "test");
    }

    #[test]
    fn test_cache_invalidate_all() {
        let cache: DetectionCache<String, bool> =
            DetectionCache::new("test", 100, Duration::from_secs(60));

        cache.insert("a".to_string(), true);
        cache.insert("b".to_string(), false);

        cache.invalidate_all();
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn test_cache_expiry() {
        let cache: DetectionCache<String, bool> =
            DetectionCache::new("test", 100, Duration::from_millis(50));

        cache.insert("key".to_string(), true);
        assert!(cache.get(&"key".to_string()).is_some());

        std::thread::sleep(Duration::from_millis(100));
        assert!(cache.get(&"key".to_string()).is_none());
    }
}
