pub mod health;
pub mod milestones;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /milestones                                     POST create, GET list
/// /milestones/{id}                                GET, PUT update
/// /milestones/{id}/sign-off                       PUT record decision
/// /milestones/{id}/close                          POST explicit close
/// /milestones/{id}/resubmissions                  POST request resubmission
/// /milestones/{id}/checkpoints                    POST add
/// /milestones/{id}/checkpoints/{checkpoint_id}    PUT edit, DELETE remove
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/milestones", milestones::router())
}
