//! Cache-aside reads.
//!
//! [`get_or_set`] looks a key up, falls back to a caller-supplied fetch on a
//! miss and stores what the fetch found. A backend failure never turns into a
//! "not found": the fetch still runs and the caller gets real data marked as
//! [`CacheStatus::Bypass`].

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::backend::CacheBackend;
use crate::error::CacheError;

/// Outcome of a typed cache read.
#[derive(Debug)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    /// The backend could not be asked. Says nothing about the key.
    Unavailable(CacheError),
}

/// Where a [`Fetched`] value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: Option<T>,
    pub status: CacheStatus,
}

impl<T> Fetched<T> {
    /// A value read straight from the primary store with no cache involved.
    pub fn bypass(value: Option<T>) -> Self {
        Self {
            value,
            status: CacheStatus::Bypass,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: self.value.map(f),
            status: self.status,
        }
    }
}

/// Reads and deserializes `key`.
///
/// An entry that no longer deserializes into `T` counts as a miss so the
/// next store overwrites it.
pub async fn lookup<B, T>(backend: &B, key: &str) -> CacheLookup<T>
where
    B: CacheBackend,
    T: DeserializeOwned,
{
    match backend.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => CacheLookup::Hit(value),
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Discarding undecodable cache entry");
                CacheLookup::Miss
            }
        },
        Ok(None) => CacheLookup::Miss,
        Err(e) => {
            warn!(cache.key = %key, error = %e, "Cache unavailable");
            CacheLookup::Unavailable(e)
        }
    }
}

/// Serializes `value` and stores it under `key` for `ttl`.
pub async fn store<B, T>(backend: &B, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
where
    B: CacheBackend,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    backend.set(key, raw, ttl).await
}

/// Returns the cached value for `key`, or runs `fetch` and caches its result.
///
/// Only `Some` results are stored. A failed store is logged and the fresh
/// value is still returned. Errors from `fetch` propagate unchanged; cache
/// errors never do.
pub async fn get_or_set<B, T, E, F, Fut>(
    backend: &B,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<Fetched<T>, E>
where
    B: CacheBackend,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    match lookup::<B, T>(backend, key).await {
        CacheLookup::Hit(value) => {
            debug!(cache.key = %key, "Cache hit");
            Ok(Fetched {
                value: Some(value),
                status: CacheStatus::Hit,
            })
        }
        CacheLookup::Unavailable(_) => {
            let value = fetch().await?;
            Ok(Fetched::bypass(value))
        }
        CacheLookup::Miss => {
            debug!(cache.key = %key, "Cache miss");
            let value = fetch().await?;

            if let Some(found) = &value
                && let Err(e) = store(backend, key, found, ttl).await
            {
                warn!(cache.key = %key, error = %e, "Failed to store fetched value");
            }

            Ok(Fetched {
                value,
                status: CacheStatus::Miss,
            })
        }
    }
}
