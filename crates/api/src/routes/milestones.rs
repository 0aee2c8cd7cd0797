//! Route definitions for milestone lifecycle operations.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{checkpoints, milestones, sign_off};
use crate::state::AppState;

/// Routes mounted under `/milestones`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(milestones::create_milestone).get(milestones::list_milestones),
        )
        .route(
            "/{id}",
            get(milestones::get_milestone).put(milestones::update_milestone),
        )
        .route("/{id}/sign-off", put(sign_off::record_sign_off))
        .route("/{id}/close", post(milestones::close_milestone))
        .route(
            "/{id}/resubmissions",
            post(milestones::request_resubmission),
        )
        .route("/{id}/checkpoints", post(checkpoints::add_checkpoint))
        .route(
            "/{id}/checkpoints/{checkpoint_id}",
            put(checkpoints::update_checkpoint).delete(checkpoints::remove_checkpoint),
        )
}
