use serde::Serialize;
use utoipa::ToSchema;

pub mod diaries;
pub mod health;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
