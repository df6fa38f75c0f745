use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use diary_api::router::init_router;
use diary_api::state::AppState;
use diary_cache::{Cache, CacheConfig, MemoryCache};
use diary_db::{DatabaseConfig, MySqlPool, Record, init_lazy_db_pool};
use diary_models::diaries_table;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub fn test_cache_config() -> CacheConfig {
    CacheConfig {
        key_prefix: "test".into(),
        ..CacheConfig::default()
    }
}

/// App without a cache: every read reports `BYPASS`.
#[allow(dead_code)]
pub fn setup_test_app(pool: MySqlPool) -> Router {
    let state = AppState::new(pool, None, &test_cache_config());
    init_router(state, None)
}

/// App backed by a fresh in-process cache.
#[allow(dead_code)]
pub fn setup_cached_test_app(pool: MySqlPool) -> Router {
    let cache = Cache::Memory(MemoryCache::new());
    let state = AppState::new(pool, Some(cache), &test_cache_config());
    init_router(state, None)
}

/// A pool pointed at a closed port. Nothing connects until a handler
/// acquires, and then it fails fast.
#[allow(dead_code)]
pub fn unreachable_pool() -> MySqlPool {
    let config = DatabaseConfig {
        port: 1,
        acquire_timeout_secs: 1,
        ..DatabaseConfig::default()
    };
    init_lazy_db_pool(&config).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    #[allow(dead_code)]
    pub fn cache(&self) -> &str {
        self.headers
            .get("x-cache")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

pub async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

#[allow(dead_code)]
pub async fn insert_diary(pool: &MySqlPool, title: &str, content: &str) -> u64 {
    let mut conn = pool.acquire().await.unwrap();
    diaries_table()
        .insert(
            &mut conn,
            &Record::new().set("title", title).set("content", content),
        )
        .await
        .unwrap()
        .unwrap()
}
