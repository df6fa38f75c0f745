//! # Diary Config
//!
//! Process-level configuration for the Diary API, loaded from environment
//! variables.
//!
//! - [`server`]: bind address and log settings
//! - [`cors`]: allowed CORS origins
//!
//! Database and cache settings live next to the code that uses them
//! (`diary_db::DatabaseConfig`, `diary_cache::CacheConfig`).

pub mod cors;
pub mod server;

pub use cors::CorsConfig;
pub use server::ServerConfig;
