//! Cache configuration.
//!
//! Loaded from environment variables like every other config struct.

use std::env;
use std::time::Duration;

/// Which store backs the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheBackendKind {
    Redis,
    Memory,
}

impl CacheBackendKind {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("memory") {
            CacheBackendKind::Memory
        } else {
            CacheBackendKind::Redis
        }
    }
}

/// Cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHE_ENABLED`: `false` or `0` disables caching (default: enabled)
/// - `CACHE_BACKEND`: `redis` or `memory` (default: `redis`)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `CACHE_TTL_SECONDS`: Default TTL for cached items in seconds (default: `300`)
/// - `APP_ENV`: Deployment environment, used as the key prefix (default: `development`)
/// - `CACHE_NAMESPACE`: Fixed namespace token after the prefix (default: `diary`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool,
    pub backend: CacheBackendKind,
    pub redis_url: String,
    pub default_ttl_seconds: u64,
    pub key_prefix: String,
    pub namespace: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env::var("CACHE_ENABLED")
                .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
                .unwrap_or(defaults.enabled),
            backend: env::var("CACHE_BACKEND")
                .map(|v| CacheBackendKind::parse(&v))
                .unwrap_or(defaults.backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            default_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_seconds),
            key_prefix: env::var("APP_ENV").unwrap_or(defaults.key_prefix),
            namespace: env::var("CACHE_NAMESPACE").unwrap_or(defaults.namespace),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackendKind::Redis,
            redis_url: "redis://127.0.0.1:6379".into(),
            default_ttl_seconds: 300,
            key_prefix: "development".into(),
            namespace: "diary".into(),
        }
    }
}
