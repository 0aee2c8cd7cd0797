//! Handler for persona sign-off decisions on a milestone.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use praxis_core::lifecycle;
use praxis_core::signoff::SignOffDecision;
use praxis_core::types::EntityId;

use crate::error::AppResult;
use crate::handlers::milestones::today;
use crate::response::{DataResponse, MilestoneView};
use crate::state::AppState;

/// Request body for `PUT /milestones/{id}/sign-off`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOffInput {
    pub persona_id: EntityId,
    #[serde(flatten)]
    pub decision: SignOffDecision,
}

/// PUT /api/v1/milestones/{id}/sign-off
///
/// Record a persona's decision and return the milestone view with the
/// recomputed completion percentage and readiness flag. 404 if the persona
/// is not among the required signers.
pub async fn record_sign_off(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<SignOffInput>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let record = state
        .store
        .update_with(id, None, |r| {
            lifecycle::record_sign_off(&r.milestone, input.persona_id, &input.decision, now)
        })
        .await?;

    let view = MilestoneView::from_record(&record, today());

    tracing::info!(
        milestone_id = %id,
        persona_id = %input.persona_id,
        status = input.decision.status.as_str(),
        completion_percentage = view.completion_percentage,
        ready_to_close = view.is_ready_to_close,
        "Sign-off recorded",
    );

    Ok(Json(DataResponse { data: view }))
}
