use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_app, metrics_middleware};
use crate::modules::diaries::init_diaries_router;
use crate::modules::health::init_health_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

fn cors_layer(state: &AppState) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static("x-cache")]);

    if state.cors_config.allows_any() {
        return layer.allow_origin(Any);
    }

    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    layer.allow_origin(allowed_origins)
}

/// `metrics` is the Prometheus handle from [`crate::metrics::init_metrics`];
/// `/metrics` is only mounted when it is present.
pub fn init_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let cors = cors_layer(&state);

    let mut router = Router::new()
        .route(
            "/api-docs/openapi.json",
            axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/health", init_health_router())
        .nest("/diaries", init_diaries_router())
        .with_state(state);

    if let Some(handle) = metrics {
        router = router.merge(metrics_app(handle));
    }

    router
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
