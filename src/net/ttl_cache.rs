//! Keyed cache with per-entry expiry, a size cap and periodic sweeping
//!
//! Expired entries are never returned even before the sweeper reclaims them.
//! Negative results may be cached by callers with a shorter TTL to avoid
//! hammering an upstream that has nothing to say.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// A cached value with its expiry
#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    expires_at: Instant,
}

/// TTL cache with size-capped insertion and oldest-first eviction
pub struct TtlCache<V> {
    name: String,
    max_size: usize,
    entries: DashMap<String, CacheEntry<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    pub fn new(name: impl Into<String>, max_size: usize) -> Self {
        Self {
            name: name.into(),
            max_size: max_size.max(1),
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the value if present and not expired
    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() < entry.expires_at {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            drop(entry);
            self.entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert a value, evicting the oldest ~20% of entries when over capacity
    pub fn put(&self, key: &str, value: V, ttl: Duration) {
        if self.entries.len() >= self.max_size && !self.entries.contains_key(key) {
            self.evict_oldest(self.max_size / 5 + 1);
        }

        let now = Instant::now();
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
                expires_at: now + ttl,
            },
        );
    }

    /// Remove all expired entries, returning how many were reclaimed
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| now < e.expires_at);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(cache = %self.name, removed, "swept expired cache entries");
        }
        removed
    }

    fn evict_oldest(&self, count: usize) {
        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().inserted_at))
            .collect();
        by_age.sort_by_key(|(_, inserted)| *inserted);

        for (key, _) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since construction
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_put_roundtrip() {
        let cache: TtlCache<u32> = TtlCache::new("test", 10);
        cache.put("a", 1, Duration::from_secs(60));
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
    }

    #[tokio::test]
    async fn test_expired_entry_not_returned_before_sweep() {
        let cache: TtlCache<u32> = TtlCache::new("test", 10);
        cache.put("a", 1, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;
        // Not yet swept, but must not be returned
        assert_eq!(cache.get("a"), None);
    }

    #[tokio::test]
    async fn test_sweep_reclaims_expired() {
        let cache: TtlCache<u32> = TtlCache::new("test", 10);
        cache.put("a", 1, Duration::from_millis(10));
        cache.put("b", 2, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(30)).await;
        let removed = cache.sweep();
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[tokio::test]
    async fn test_size_cap_evicts_oldest() {
        let cache: TtlCache<u32> = TtlCache::new("test", 5);
        for i in 0..5 {
            cache.put(&format!("k{}", i), i, Duration::from_secs(60));
            // Distinct insertion instants so eviction order is stable
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        cache.put("k5", 5, Duration::from_secs(60));
        assert!(cache.len() <= 5);
        // Oldest entries went first
        assert_eq!(cache.get("k0"), None);
        assert_eq!(cache.get("k5"), Some(5));
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let cache: TtlCache<u32> = TtlCache::new("test", 10);
        cache.put("a", 1, Duration::from_secs(60));
        cache.get("a");
        cache.get("a");
        cache.get("missing");
        let (hits, misses) = cache.stats();
        assert_eq!(hits, 2);
        assert_eq!(misses, 1);
    }
}
