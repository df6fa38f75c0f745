//! Storage primitives shared by every cache backend.

use std::future::Future;
use std::time::Duration;

use crate::error::CacheError;

/// Longest lifetime any backend will give an entry. Longer TTLs are capped.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Raw string get/set/del/expire.
///
/// Every primitive reports backend failures as [`CacheError`] instead of
/// folding them into "absent", so callers can tell a miss from an outage.
///
/// TTLs mean the same on every backend: a zero TTL removes the key, and
/// anything above [`MAX_TTL`] is treated as [`MAX_TTL`].
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// True when the key existed.
    fn del(&self, key: &str) -> impl Future<Output = Result<bool, CacheError>> + Send;

    /// True when the key existed and now carries `ttl`. A zero `ttl`
    /// removes the key and reports whether it was there.
    fn expire(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool, CacheError>> + Send;
}
