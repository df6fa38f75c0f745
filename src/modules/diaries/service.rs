use std::sync::LazyLock;

use anyhow::anyhow;
use chrono::Utc;
use diary_cache::CacheStatus;
use diary_core::{AppError, PaginationMeta};
use diary_db::{DbError, Filter, Predicate, Table};
use diary_models::{
    CreateDiaryDto, Diary, DiaryFilterParams, DiaryWritten, PaginatedDiariesResponse,
    UpdateDiaryDto, diaries_table,
};
use tracing::{info, instrument};

use crate::cached::CachedTable;
use crate::metrics::{track_db_write, track_diary_created};
use crate::state::AppState;

static DIARIES: LazyLock<Table> = LazyLock::new(diaries_table);

/// Maps data-access failures onto HTTP statuses: rejected input is the
/// caller's fault, everything else is ours.
fn db_error(err: DbError) -> AppError {
    if err.is_validation() {
        AppError::bad_request(err)
    } else {
        AppError::internal(err)
    }
}

fn by_id(id: u64) -> Filter {
    Filter::new().eq("id", id)
}

pub struct DiaryService;

impl DiaryService {
    #[instrument(skip(state))]
    pub async fn list(
        state: &AppState,
        params: &DiaryFilterParams,
    ) -> Result<(PaginatedDiariesResponse, CacheStatus), AppError> {
        let sort = params.sort();
        let fetched = CachedTable::from_state(&DIARIES, state)
            .find_page::<Diary>(&params.filter(), &[], params.page_request(), sort.as_ref())
            .await
            .map_err(db_error)?;

        let page = fetched.value.unwrap_or_default();
        let response = PaginatedDiariesResponse {
            meta: PaginationMeta::new(page.total_count, page.page, page.page_size),
            data: page.rows,
        };

        Ok((response, fetched.status))
    }

    #[instrument(skip(state))]
    pub async fn get(state: &AppState, id: u64) -> Result<(Diary, CacheStatus), AppError> {
        let fetched = CachedTable::from_state(&DIARIES, state)
            .find_one::<Diary>(&by_id(id), &[])
            .await
            .map_err(db_error)?;

        match fetched.value {
            Some(diary) => Ok((diary, fetched.status)),
            None => Err(AppError::not_found(anyhow!("Diary {id} not found"))),
        }
    }

    #[instrument(skip(state, dto))]
    pub async fn create(state: &AppState, dto: CreateDiaryDto) -> Result<DiaryWritten, AppError> {
        let mut conn = state.db.acquire().await?;
        let result = DIARIES.insert(&mut conn, &dto.to_record()).await;
        track_db_write("insert", result.is_ok());

        let id = result
            .map_err(db_error)?
            .ok_or_else(|| AppError::internal(anyhow!("Insert reported no affected rows")))?;

        track_diary_created();
        info!(diary.id = id, "Diary created");

        Ok(DiaryWritten {
            id,
            title: dto.title,
            content: dto.content,
        })
    }

    #[instrument(skip(state, dto))]
    pub async fn update(
        state: &AppState,
        id: u64,
        dto: UpdateDiaryDto,
    ) -> Result<DiaryWritten, AppError> {
        let mut conn = state.db.acquire().await?;
        let result = DIARIES
            .update_by_filter(&mut conn, &Predicate::from(by_id(id)), &dto.to_record(Utc::now()))
            .await;
        track_db_write("update", result.is_ok());

        if !result.map_err(db_error)? {
            return Err(AppError::not_found(anyhow!("Diary {id} not found")));
        }

        Ok(DiaryWritten {
            id,
            title: dto.title,
            content: dto.content,
        })
    }

    #[instrument(skip(state))]
    pub async fn delete(state: &AppState, id: u64) -> Result<(), AppError> {
        let mut conn = state.db.acquire().await?;
        let result = DIARIES
            .delete_by_filter(&mut conn, &Predicate::from(by_id(id)))
            .await;
        track_db_write("delete", result.is_ok());

        if !result.map_err(db_error)? {
            return Err(AppError::not_found(anyhow!("Diary {id} not found")));
        }

        info!(diary.id = id, "Diary deleted");
        Ok(())
    }
}
