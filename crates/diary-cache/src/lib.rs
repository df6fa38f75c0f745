//! # Diary Cache
//!
//! Cache-aside helpers for the Diary API.
//!
//! This crate provides:
//! - A [`CacheBackend`] trait with `get`/`set`/`del`/`expire` primitives
//! - Redis and in-process backends, picked at startup by [`Cache::connect`]
//! - [`get_or_set`], which reports whether a value was a hit, a miss or
//!   fetched around an unavailable backend
//! - Canonical cache key generation
//!
//! # Example
//!
//! ```ignore
//! use diary_cache::{Cache, CacheConfig, CacheKeys, get_or_set};
//!
//! let config = CacheConfig::from_env();
//! let keys = CacheKeys::from_config(&config);
//! if let Some(cache) = Cache::connect(&config).await? {
//!     let key = keys.table_query("diaries", "find_one", &filter)?;
//!     let fetched = get_or_set(&cache, &key, config.default_ttl(), || load(id)).await?;
//! }
//! ```

pub mod aside;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod memory;
pub mod redis;

pub use aside::{CacheLookup, CacheStatus, Fetched, get_or_set, lookup, store};
pub use backend::{CacheBackend, MAX_TTL};
pub use cache::Cache;
pub use config::{CacheBackendKind, CacheConfig};
pub use error::CacheError;
pub use keys::{CacheKeys, KEY_DELIMITER, canonical_json};
pub use memory::MemoryCache;
pub use self::redis::RedisCache;
