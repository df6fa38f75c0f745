//! Diary domain models and DTOs.

use chrono::{DateTime, Utc};
use diary_core::{PaginationMeta, PaginationParams};
use diary_db::{Filter, PageRequest, Record, Sort, Table};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub const DIARY_TABLE: &str = "diaries";

/// Table binding for `diaries`: primary key `id`, newest first by default.
pub fn diaries_table() -> Table {
    Table::new(DIARY_TABLE, "id")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Diary {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDiaryDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

impl CreateDiaryDto {
    pub fn to_record(&self) -> Record {
        Record::new()
            .set("title", &self.title)
            .set("content", &self.content)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDiaryDto {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

impl UpdateDiaryDto {
    /// Assignments for `UPDATE`. `updated_at` is stamped here rather than
    /// left to the column default so MySQL always sees a change.
    pub fn to_record(&self, now: DateTime<Utc>) -> Record {
        Record::new()
            .set("title", &self.title)
            .set("content", &self.content)
            .set("updated_at", now)
    }
}

/// Echo of a write: the id plus the fields that were stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiaryWritten {
    pub id: u64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema, utoipa::IntoParams)]
pub struct DiaryFilterParams {
    /// Substring match on the title
    pub title: Option<String>,
    /// Substring match on the content
    pub content: Option<String>,
    /// Comma-separated `column[:asc|desc]` pairs, e.g. `created_at:desc,title`
    pub sort: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl DiaryFilterParams {
    /// Blank strings mean "no constraint".
    pub fn filter(&self) -> Filter {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Filter::new()
            .like("title", non_blank(&self.title))
            .like("content", non_blank(&self.content))
    }

    pub fn sort(&self) -> Option<Sort> {
        self.sort
            .as_deref()
            .map(Sort::parse_pairs)
            .filter(|sort| !sort.is_empty())
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.pagination.page(), self.pagination.page_size())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedDiariesResponse {
    pub data: Vec<Diary>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use diary_db::{Operator, SqlValue, SortKey};

    #[test]
    fn test_create_diary_dto_validation() {
        let valid = CreateDiaryDto {
            title: "Day one".to_string(),
            content: "It rained.".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_title = CreateDiaryDto {
            title: "".to_string(),
            content: "x".to_string(),
        };
        assert!(empty_title.validate().is_err());

        let long_title = CreateDiaryDto {
            title: "x".repeat(256),
            content: "x".to_string(),
        };
        assert!(long_title.validate().is_err());

        let empty_content = CreateDiaryDto {
            title: "t".to_string(),
            content: "".to_string(),
        };
        assert!(empty_content.validate().is_err());
    }

    #[test]
    fn test_create_record_columns() {
        let dto = CreateDiaryDto {
            title: "t".into(),
            content: "c".into(),
        };
        let record = dto.to_record();
        let columns: Vec<&str> = record.fields().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["title", "content"]);
    }

    #[test]
    fn test_update_record_stamps_updated_at() {
        let dto = UpdateDiaryDto {
            title: "t".into(),
            content: "c".into(),
        };
        let now = Utc::now();
        let record = dto.to_record(now);
        assert!(
            record
                .fields()
                .any(|(c, v)| c == "updated_at" && *v == SqlValue::DateTime(now))
        );
    }

    #[test]
    fn test_filter_skips_blank_values() {
        let params = DiaryFilterParams {
            title: Some("rain".into()),
            content: Some("  ".into()),
            ..Default::default()
        };
        let filter = params.filter();
        let active: Vec<_> = filter.active().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].column, "title");
        assert_eq!(active[0].op, Operator::Like);
    }

    #[test]
    fn test_sort_parsing() {
        let params = DiaryFilterParams {
            sort: Some("created_at:desc,title".into()),
            ..Default::default()
        };
        assert_eq!(
            params.sort(),
            Some(Sort::keys([SortKey::desc("created_at"), SortKey::asc("title")]))
        );

        let blank = DiaryFilterParams {
            sort: Some(" , ".into()),
            ..Default::default()
        };
        assert_eq!(blank.sort(), None);
    }

    #[test]
    fn test_page_request_uses_clamped_values() {
        let params = DiaryFilterParams {
            pagination: PaginationParams {
                page: Some(0),
                page_size: Some(500),
            },
            ..Default::default()
        };
        assert_eq!(params.page_request(), PageRequest::new(1, 100));
    }

    #[test]
    fn test_table_binding() {
        let table = diaries_table();
        assert_eq!(table.name(), "diaries");
        assert_eq!(table.primary_key(), "id");
    }
}
