//! The configured cache backend.

use std::time::Duration;

use tracing::info;

use crate::backend::CacheBackend;
use crate::config::{CacheBackendKind, CacheConfig};
use crate::error::CacheError;
use crate::memory::MemoryCache;
use crate::redis::RedisCache;

#[derive(Clone, Debug)]
pub enum Cache {
    Redis(RedisCache),
    Memory(MemoryCache),
}

impl Cache {
    /// Builds the backend named by `config`, or `None` when caching is
    /// disabled.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if Redis is selected and unreachable.
    pub async fn connect(config: &CacheConfig) -> Result<Option<Self>, CacheError> {
        if !config.enabled {
            info!("Cache disabled");
            return Ok(None);
        }

        let cache = match config.backend {
            CacheBackendKind::Memory => Cache::Memory(MemoryCache::new()),
            CacheBackendKind::Redis => Cache::Redis(RedisCache::new(&config.redis_url).await?),
        };
        info!(cache.backend = cache.backend_name(), "Cache initialized");
        Ok(Some(cache))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Cache::Redis(_) => "redis",
            Cache::Memory(_) => "memory",
        }
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        match self {
            Cache::Redis(redis) => redis.ping().await,
            Cache::Memory(_) => Ok(()),
        }
    }
}

impl CacheBackend for Cache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            Cache::Redis(c) => c.get(key).await,
            Cache::Memory(c) => c.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        match self {
            Cache::Redis(c) => c.set(key, value, ttl).await,
            Cache::Memory(c) => c.set(key, value, ttl).await,
        }
    }

    async fn del(&self, key: &str) -> Result<bool, CacheError> {
        match self {
            Cache::Redis(c) => c.del(key).await,
            Cache::Memory(c) => c.del(key).await,
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        match self {
            Cache::Redis(c) => c.expire(key, ttl).await,
            Cache::Memory(c) => c.expire(key, ttl).await,
        }
    }
}
