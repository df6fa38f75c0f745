use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{create_diary, delete_diary, get_diaries, get_diary, update_diary};

pub fn init_diaries_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_diaries).post(create_diary))
        .route(
            "/{id}",
            get(get_diary).put(update_diary).delete(delete_diary),
        )
}
