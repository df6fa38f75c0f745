//! # Diary DB
//!
//! MySQL pool setup and a table-bound query layer for the Diary API.
//!
//! Structured inputs ([`Filter`], [`Sort`], [`Record`], [`PageRequest`]) are
//! compiled into parameterized SQL by [`query`] and executed by [`Table`]
//! over a caller-supplied connection.
//!
//! # Example
//!
//! ```ignore
//! use diary_db::{DatabaseConfig, Filter, Record, Table, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! let diaries = Table::new("diaries", "id");
//!
//! let mut conn = pool.acquire().await?;
//! let id = diaries
//!     .insert(&mut conn, &Record::new().set("title", "Day one").set("content", "..."))
//!     .await?;
//!
//! let row: Option<Diary> = diaries
//!     .find_one(&mut conn, &Filter::new().eq("id", id), &[])
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod pool;
pub mod query;
pub mod record;
pub mod sort;
pub mod table;
pub mod transaction;
pub mod value;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use filter::{Condition, Filter, Operator, Predicate};
pub use pool::{init_db_pool, init_lazy_db_pool};
pub use record::Record;
pub use sort::{Direction, Sort, SortKey};
pub use table::{Page, PageRequest, Table};
pub use value::SqlValue;

pub use sqlx::{MySqlConnection, MySqlPool};
