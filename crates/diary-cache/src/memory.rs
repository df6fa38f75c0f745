//! In-process cache backend.
//!
//! Used when `CACHE_BACKEND=memory` and by tests that exercise the
//! cache-aside flow without a Redis server. Expiry times are indexed in
//! deadline order; every operation first drops the entries whose deadline
//! has passed, so keys nobody reads again are still freed.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::backend::{CacheBackend, MAX_TTL};
use crate::error::CacheError;

#[derive(Debug)]
struct Entry {
    value: String,
    /// `None` when the deadline does not fit in an `Instant`.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|when| now >= when)
    }
}

fn deadline(now: Instant, ttl: Duration) -> Option<Instant> {
    now.checked_add(ttl.min(MAX_TTL))
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    expirations: BTreeSet<(Instant, String)>,
}

impl State {
    fn purge_expired(&mut self, now: Instant) {
        while let Some((when, _)) = self.expirations.first() {
            if *when > now {
                break;
            }
            if let Some((_, key)) = self.expirations.pop_first() {
                self.entries.remove(&key);
                debug!(cache.key = %key, "Entry expired");
            }
        }
    }

    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        if let Some(when) = entry.expires_at {
            self.expirations.remove(&(when, key.to_string()));
        }
        Some(entry)
    }

    fn insert(&mut self, key: String, entry: Entry) {
        self.remove(&key);
        if let Some(when) = entry.expires_at {
            self.expirations.insert((when, key.clone()));
        }
        self.entries.insert(key, entry);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    state: Arc<Mutex<State>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the state with expired entries already dropped.
    fn lock(&self, now: Instant) -> MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.purge_expired(now);
        state
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock(Instant::now()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let state = self.lock(now);

        Ok(state
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut state = self.lock(now);

        if ttl.is_zero() {
            state.remove(key);
            return Ok(());
        }

        let entry = Entry {
            value,
            expires_at: deadline(now, ttl),
        };
        state.insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.lock(Instant::now()).remove(key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let now = Instant::now();
        let mut state = self.lock(now);

        let Some(entry) = state.remove(key) else {
            return Ok(false);
        };

        if !ttl.is_zero() {
            let entry = Entry {
                value: entry.value,
                expires_at: deadline(now, ttl),
            };
            state.insert(key.to_string(), entry);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(cache: &MemoryCache) -> (usize, usize) {
        let state = cache.state.lock().unwrap();
        (state.entries.len(), state.expirations.len())
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("nope").await.unwrap(), None);
        assert!(!cache.del("nope").await.unwrap());
        assert!(!cache.expire("nope", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_removes_key() {
        let cache = MemoryCache::new();
        cache
            .set("k", "old".into(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.set("k", "new".into(), Duration::ZERO).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_expire_zero_removes_live_key() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.expire("k", Duration::ZERO).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(stored(&cache), (0, 0));
    }

    #[tokio::test]
    async fn test_expire_extends_lifetime() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".into(), Duration::from_millis(20))
            .await
            .unwrap();
        assert!(cache.expire("k", Duration::from_secs(60)).await.unwrap());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(stored(&cache), (1, 1));
    }

    #[tokio::test]
    async fn test_unread_expired_entries_are_freed() {
        let cache = MemoryCache::new();
        for i in 0..1000 {
            cache
                .set(&format!("short:{i}"), "v".into(), Duration::from_millis(1))
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        cache
            .set("live", "v".into(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(stored(&cache), (1, 1));
        assert_eq!(cache.get("live").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_panic() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".into(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();
        assert!(cache.expire("k", Duration::MAX).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_del() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.del("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(stored(&cache), (0, 0));
    }
}
