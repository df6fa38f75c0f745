//! # Diary Models
//!
//! Domain models and DTOs for the Diary API.
//!
//! - [`diaries`]: the diary entity, request bodies, list filters and the
//!   table binding used by every data-access call
//!
//! # Example
//!
//! ```ignore
//! use diary_models::{Diary, DiaryFilterParams, diaries_table};
//!
//! let table = diaries_table();
//! let page = table
//!     .find_page::<Diary>(&mut conn, &params.filter(), &[], params.page_request(), params.sort().as_ref())
//!     .await?;
//! ```

pub mod diaries;

pub use diaries::{
    CreateDiaryDto, DIARY_TABLE, Diary, DiaryFilterParams, DiaryWritten, PaginatedDiariesResponse,
    UpdateDiaryDto, diaries_table,
};
