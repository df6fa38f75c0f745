use std::time::Duration;

use diary_cache::{Cache, CacheConfig, CacheKeys};
use diary_config::CorsConfig;
use diary_db::{DatabaseConfig, MySqlPool, init_db_pool};
use tracing::warn;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: MySqlPool,
    /// `None` when caching is disabled or the backend was unreachable at
    /// startup; reads then go straight to MySQL.
    pub cache: Option<Cache>,
    pub cache_keys: CacheKeys,
    pub cache_ttl: Duration,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(db: MySqlPool, cache: Option<Cache>, cache_config: &CacheConfig) -> Self {
        Self {
            db,
            cache,
            cache_keys: CacheKeys::from_config(cache_config),
            cache_ttl: cache_config.default_ttl(),
            cors_config: CorsConfig::from_env(),
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db = init_db_pool(&DatabaseConfig::from_env()).await?;

    let cache_config = CacheConfig::from_env();
    let cache = match Cache::connect(&cache_config).await {
        Ok(cache) => cache,
        Err(e) => {
            warn!(error = %e, "Cache unreachable, continuing without it");
            None
        }
    };

    Ok(AppState::new(db, cache, &cache_config))
}
