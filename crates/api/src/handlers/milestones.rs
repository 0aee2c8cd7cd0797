//! Handlers for milestone CRUD and lifecycle actions.
//!
//! Handlers supply the clock (`now`/`today`) and the store cycle; all
//! domain decisions are delegated to `praxis_core`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use praxis_core::lifecycle;
use praxis_core::milestone::{MilestoneDraft, MilestonePatch};
use praxis_core::types::EntityId;

use crate::error::AppResult;
use crate::response::{DataResponse, MilestoneView};
use crate::state::AppState;

/// Local calendar date used for due-date validation and overdue derivation.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/milestones
///
/// Validate a milestone draft and store it. Returns 400 with the
/// field-keyed `errors` map when validation fails.
pub async fn create_milestone(
    State(state): State<AppState>,
    Json(draft): Json<MilestoneDraft>,
) -> AppResult<impl IntoResponse> {
    let today = today();
    let milestone = lifecycle::create(&draft, Utc::now(), today)?;
    let record = state.store.insert(milestone).await;

    tracing::info!(
        milestone_id = %record.milestone.id,
        project_id = %record.milestone.project_id,
        milestone_type = record.milestone.milestone_type.as_str(),
        personas = record.milestone.persona_sign_offs.len(),
        "Milestone created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: MilestoneView::from_record(&record, today),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/milestones
///
/// List all milestones, oldest first.
pub async fn list_milestones(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let today = today();
    let views: Vec<MilestoneView> = state
        .store
        .list()
        .await
        .iter()
        .map(|r| MilestoneView::from_record(r, today))
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/milestones/{id}
pub async fn get_milestone(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let record = state.store.get(id).await?;
    Ok(Json(DataResponse {
        data: MilestoneView::from_record(&record, today()),
    }))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Request body for `PUT /milestones/{id}`.
///
/// The patch fields sit directly in the body; `version` optionally carries
/// the caller's last-seen record version for an optimistic-concurrency
/// check.
#[derive(Debug, Deserialize)]
pub struct UpdateMilestoneInput {
    #[serde(flatten)]
    pub patch: MilestonePatch,
    pub version: Option<u64>,
}

/// PUT /api/v1/milestones/{id}
///
/// Merge the patch and re-validate the whole milestone; partial patches
/// are never validated in isolation.
pub async fn update_milestone(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateMilestoneInput>,
) -> AppResult<impl IntoResponse> {
    let today = today();
    let now = Utc::now();

    let record = state
        .store
        .update_with(id, input.version, |r| {
            lifecycle::update(&r.milestone, &input.patch, now, today)
        })
        .await?;

    tracing::info!(milestone_id = %id, version = record.version, "Milestone updated");

    Ok(Json(DataResponse {
        data: MilestoneView::from_record(&record, today),
    }))
}

// ---------------------------------------------------------------------------
// Close
// ---------------------------------------------------------------------------

/// POST /api/v1/milestones/{id}/close
///
/// Explicit terminal transition; 409 if already closed.
pub async fn close_milestone(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let record = state
        .store
        .update_with(id, None, |r| lifecycle::close(&r.milestone, now))
        .await?;

    tracing::info!(milestone_id = %id, "Milestone closed");

    Ok(Json(DataResponse {
        data: MilestoneView::from_record(&record, today()),
    }))
}

// ---------------------------------------------------------------------------
// Resubmission
// ---------------------------------------------------------------------------

/// Typed response for a granted resubmission request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResubmissionResponse {
    pub milestone_id: EntityId,
    pub resubmission_count: u32,
    pub max_resubmissions: u32,
}

/// POST /api/v1/milestones/{id}/resubmissions
///
/// Run the engine's guard and bump the store-owned counter; 409 with
/// `LIMIT_EXCEEDED` once the cap is reached or resubmission is disabled.
pub async fn request_resubmission(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let record = state.store.record_resubmission(id).await?;

    tracing::info!(
        milestone_id = %id,
        resubmission_count = record.resubmission_count,
        "Resubmission granted",
    );

    Ok(Json(DataResponse {
        data: ResubmissionResponse {
            milestone_id: id,
            resubmission_count: record.resubmission_count,
            max_resubmissions: record.milestone.settings.max_resubmissions,
        },
    }))
}
