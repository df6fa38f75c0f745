//! Pagination utilities for API responses.
//!
//! Listing endpoints are page-based:
//! - `page`: Page number (1-indexed, default: 1)
//! - `page_size`: Items per page (1-100, default: 10)
//!
//! The HTTP layer clamps both values so the data-access layer never sees a
//! page below 1.
//!
//! # Example
//!
//! ```ignore
//! async fn list_diaries(
//!     Query(params): Query<PaginationParams>,
//! ) -> Result<Json<PaginatedResponse>, AppError> {
//!     let page = params.page();
//!     let page_size = params.page_size();
//!
//!     let (rows, total) = fetch_page(page, page_size).await?;
//!
//!     Ok(Json(PaginatedResponse {
//!         data: rows,
//!         meta: PaginationMeta::new(total, page, page_size),
//!     }))
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Deserializes an optional string into an optional i64.
///
/// Query parameters arrive as strings; an empty string is treated as `None`.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata about a paginated response.
///
/// ```json
/// {
///   "data": [...],
///   "meta": {
///     "total": 42,
///     "page": 2,
///     "page_size": 10,
///     "total_pages": 5,
///     "has_more": true
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: i64,
    /// Items per page
    pub page_size: i64,
    /// `ceil(total / page_size)`
    pub total_pages: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = total_pages(total, page_size);
        Self {
            total,
            page,
            page_size,
            total_pages,
            has_more: page < total_pages,
        }
    }
}

/// `ceil(total / page_size)`, zero when `page_size` is not positive.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

/// Query parameters for page-based pagination.
///
/// - `page_size` is clamped to [1, 100]
/// - `page` is clamped to a minimum of 1
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page_size: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

impl PaginationParams {
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_pagination_params_none_values() {
        let params = PaginationParams {
            page: None,
            page_size: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);
    }

    #[test]
    fn test_page_below_one_is_clamped() {
        let params = PaginationParams {
            page: Some(-3),
            page_size: Some(10),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_page_size_boundary_cases() {
        let cases = vec![(Some(0), 1), (Some(-1), 1), (Some(50), 50), (Some(101), 100)];

        for (input, expected) in cases {
            let params = PaginationParams {
                page: Some(1),
                page_size: input,
            };
            assert_eq!(params.page_size(), expected);
        }
    }

    #[test]
    fn test_offset_from_page() {
        let params = PaginationParams {
            page: Some(3),
            page_size: Some(20),
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_meta_has_more() {
        let meta = PaginationMeta::new(25, 2, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_more);

        let last = PaginationMeta::new(25, 3, 10);
        assert!(!last.has_more);
    }

    #[test]
    fn test_pagination_params_deserialize_with_values() {
        let json = r#"{"page":"4","page_size":"25"}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.page(), 4);
        assert_eq!(params.page_size(), 25);
        assert_eq!(params.offset(), 75);
    }

    #[test]
    fn test_pagination_params_deserialize_empty_strings() {
        let json = r#"{"page":"","page_size":""}"#;
        let params: PaginationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 10);
    }

    #[test]
    fn test_pagination_meta_serialize() {
        let meta = PaginationMeta::new(100, 3, 20);
        let serialized = serde_json::to_string(&meta).unwrap();
        assert!(serialized.contains(r#""total":100"#));
        assert!(serialized.contains(r#""page_size":20"#));
        assert!(serialized.contains(r#""total_pages":5"#));
        assert!(serialized.contains(r#""has_more":true"#));
    }
}
