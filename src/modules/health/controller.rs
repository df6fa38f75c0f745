use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use sqlx::Connection;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the database answers, `unavailable` otherwise
    pub status: String,
    pub database: String,
    /// `disabled`, `up` or `down`. A down cache does not fail the check.
    pub cache: String,
    pub version: String,
}

async fn database_up(state: &AppState) -> bool {
    let result = match state.db.acquire().await {
        Ok(mut conn) => conn.ping().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    }
}

async fn cache_status(state: &AppState) -> &'static str {
    let Some(cache) = &state.cache else {
        return "disabled";
    };

    match cache.ping().await {
        Ok(()) => "up",
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            "down"
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_up = database_up(&state).await;
    let cache = cache_status(&state).await;

    let (code, status) = if database_up {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            database: if database_up { "up" } else { "down" }.to_string(),
            cache: cache.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
