//! Redis-backed cache client.

use std::time::Duration;

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, instrument};

use crate::backend::{CacheBackend, MAX_TTL};
use crate::error::CacheError;

/// Whole milliseconds, rounded up so a sub-millisecond TTL still stores.
fn ttl_millis(ttl: Duration) -> u64 {
    let capped = ttl.min(MAX_TTL);
    let millis = capped.as_millis() + u128::from(capped.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Redis cache client. Clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL is invalid or the server
    /// cannot be reached.
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }

    #[instrument(skip(self), fields(cache.operation = "PING"))]
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

impl CacheBackend for RedisCache {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();

        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            error!(cache.key = %key, error = %e, "Redis GET error");
            CacheError::from(e)
        })
    }

    #[instrument(skip(self, value), fields(cache.operation = "PSETEX"))]
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            self.del(key).await?;
            return Ok(());
        }

        let mut conn = self.conn.clone();
        let millis = ttl_millis(ttl);

        conn.pset_ex::<_, _, ()>(key, value, millis)
            .await
            .map_err(|e| {
                error!(cache.key = %key, error = %e, "Redis PSETEX error");
                CacheError::from(e)
            })?;

        debug!(cache.key = %key, cache.ttl_ms = millis, "Cache set");
        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();

        let removed: i64 = conn.del(key).await.map_err(|e| {
            error!(cache.key = %key, error = %e, "Redis DEL error");
            CacheError::from(e)
        })?;

        debug!(cache.key = %key, "Cache invalidated");
        Ok(removed > 0)
    }

    #[instrument(skip(self), fields(cache.operation = "PEXPIRE"))]
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        if ttl.is_zero() {
            return self.del(key).await;
        }

        let mut conn = self.conn.clone();
        let millis = i64::try_from(ttl_millis(ttl)).unwrap_or(i64::MAX);

        conn.pexpire::<_, bool>(key, millis).await.map_err(|e| {
            error!(cache.key = %key, error = %e, "Redis PEXPIRE error");
            CacheError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_set_get_del() {
        let cache = RedisCache::new("redis://localhost:6379").await.unwrap();

        cache
            .set("diary:test:key", "\"value\"".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("diary:test:key").await.unwrap(),
            Some("\"value\"".to_string())
        );

        assert!(cache.expire("diary:test:key", Duration::from_secs(5)).await.unwrap());
        assert!(cache.del("diary:test:key").await.unwrap());
        assert_eq!(cache.get("diary:test:key").await.unwrap(), None);
    }

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(2)), 2_000);
        assert_eq!(ttl_millis(Duration::from_micros(1)), 1);
        assert_eq!(ttl_millis(Duration::from_micros(1_500)), 2);
        assert_eq!(ttl_millis(Duration::MAX), MAX_TTL.as_millis() as u64);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_zero_ttl_removes_key() {
        let cache = RedisCache::new("redis://localhost:6379").await.unwrap();

        cache
            .set("diary:test:zero", "\"old\"".into(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("diary:test:zero", "\"new\"".into(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(cache.get("diary:test:zero").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_ping() {
        let cache = RedisCache::new("redis://localhost:6379").await.unwrap();
        assert!(cache.ping().await.is_ok());
    }
}
