//! # Diary Core
//!
//! Core types, errors, and utilities for the Diary API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination parameters and response metadata
//!
//! # Example
//!
//! ```ignore
//! use diary_core::errors::AppError;
//! use diary_core::pagination::{PaginationParams, PaginationMeta};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Diary not found"));
//!
//! let params = PaginationParams::default();
//! let meta = PaginationMeta::new(42, params.page(), params.page_size());
//! assert_eq!(meta.total_pages, 5);
//! ```

pub mod errors;
pub mod pagination;

pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
