use utoipa::OpenApi;

use diary_core::{PaginationMeta, PaginationParams};
use diary_models::{
    CreateDiaryDto, Diary, DiaryFilterParams, DiaryWritten, PaginatedDiariesResponse,
    UpdateDiaryDto,
};

use crate::modules::ErrorResponse;
use crate::modules::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::diaries::controller::get_diaries,
        crate::modules::diaries::controller::get_diary,
        crate::modules::diaries::controller::create_diary,
        crate::modules::diaries::controller::update_diary,
        crate::modules::diaries::controller::delete_diary,
    ),
    components(
        schemas(
            Diary,
            CreateDiaryDto,
            UpdateDiaryDto,
            DiaryWritten,
            DiaryFilterParams,
            PaginatedDiariesResponse,
            PaginationMeta,
            PaginationParams,
            HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Diaries", description = "Diary entries"),
        (name = "Health", description = "Liveness and dependency checks"),
    ),
    info(
        title = "Diary API",
        description = "CRUD service for diary entries backed by MySQL with a cache-aside read path",
    )
)]
pub struct ApiDoc;
