use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use diary_core::AppError;
use diary_models::{
    CreateDiaryDto, Diary, DiaryFilterParams, DiaryWritten, PaginatedDiariesResponse,
    UpdateDiaryDto,
};
use tracing::instrument;

use crate::cached::cache_header;
use crate::modules::diaries::service::DiaryService;
use crate::modules::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/diaries",
    params(DiaryFilterParams),
    responses(
        (status = 200, description = "Page of diaries. `x-cache` tells whether it came from the cache", body = PaginatedDiariesResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    tag = "Diaries"
)]
#[instrument(skip(state))]
pub async fn get_diaries(
    State(state): State<AppState>,
    Query(params): Query<DiaryFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let (page, status) = DiaryService::list(&state, &params).await?;
    Ok((cache_header(status), Json(page)))
}

#[utoipa::path(
    get,
    path = "/diaries/{id}",
    params(
        ("id" = u64, Path, description = "Diary ID")
    ),
    responses(
        (status = 200, description = "Diary details", body = Diary),
        (status = 404, description = "Diary not found", body = ErrorResponse)
    ),
    tag = "Diaries"
)]
#[instrument(skip(state))]
pub async fn get_diary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let (diary, status) = DiaryService::get(&state, id).await?;
    Ok((cache_header(status), Json(diary)))
}

#[utoipa::path(
    post,
    path = "/diaries",
    request_body = CreateDiaryDto,
    responses(
        (status = 201, description = "Diary created", body = DiaryWritten),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Diaries"
)]
#[instrument(skip(state, dto))]
pub async fn create_diary(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateDiaryDto>,
) -> Result<(StatusCode, Json<DiaryWritten>), AppError> {
    let diary = DiaryService::create(&state, dto).await?;
    Ok((StatusCode::CREATED, Json(diary)))
}

#[utoipa::path(
    put,
    path = "/diaries/{id}",
    params(
        ("id" = u64, Path, description = "Diary ID")
    ),
    request_body = UpdateDiaryDto,
    responses(
        (status = 200, description = "Diary updated", body = DiaryWritten),
        (status = 404, description = "Diary not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Diaries"
)]
#[instrument(skip(state, dto))]
pub async fn update_diary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ValidatedJson(dto): ValidatedJson<UpdateDiaryDto>,
) -> Result<Json<DiaryWritten>, AppError> {
    let diary = DiaryService::update(&state, id, dto).await?;
    Ok(Json(diary))
}

#[utoipa::path(
    delete,
    path = "/diaries/{id}",
    params(
        ("id" = u64, Path, description = "Diary ID")
    ),
    responses(
        (status = 204, description = "Diary deleted"),
        (status = 404, description = "Diary not found", body = ErrorResponse)
    ),
    tag = "Diaries"
)]
#[instrument(skip(state))]
pub async fn delete_diary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    DiaryService::delete(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
