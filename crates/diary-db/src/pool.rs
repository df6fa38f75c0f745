//! Connection pool construction.

use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::DbResult;

fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

/// Opens a bounded MySQL pool and verifies one connection.
///
/// The pool is cheaply cloneable; build it once at startup and hand it to the
/// application state. Call [`MySqlPool::close`] on shutdown to drain it.
pub async fn init_db_pool(config: &DatabaseConfig) -> DbResult<MySqlPool> {
    let pool = pool_options(config)
        .connect_with(config.connect_options()?)
        .await?;

    info!(
        db.max_connections = config.max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}

/// Builds a pool that connects on first use.
pub fn init_lazy_db_pool(config: &DatabaseConfig) -> DbResult<MySqlPool> {
    Ok(pool_options(config).connect_lazy_with(config.connect_options()?))
}
