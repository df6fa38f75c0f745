//! # Diary CLI
//!
//! Maintenance scripts for the Diary API database, built on the same
//! table-bound query layer the HTTP service uses.
//!
//! ## Usage
//!
//! ```ignore
//! use diary_cli::{maintenance, seeder};
//!
//! let ids = seeder::seed_diaries(&pool, 50).await?;
//! let remaining = maintenance::count(&pool, None).await?;
//! ```

pub mod maintenance;
pub mod seeder;
