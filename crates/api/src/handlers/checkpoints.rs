//! Handlers for checkpoint operations scoped under `/milestones/{id}`.
//!
//! Every mutation returns the milestone's updated `checkpoints` list. The
//! engine operates on the list as a value; the existence of the parent
//! milestone is enforced here (404) rather than inside the engine.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use praxis_core::checkpoint::{self, Checkpoint, CheckpointDraft, CheckpointPatch};
use praxis_core::milestone::Milestone;
use praxis_core::types::EntityId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

/// POST /api/v1/milestones/{id}/checkpoints
///
/// Add a checkpoint to an existing milestone. The new checkpoint starts
/// pending with its own independently tracked sign-offs.
pub async fn add_checkpoint(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(draft): Json<CheckpointDraft>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let record = state
        .store
        .update_with(id, None, |r| {
            let checkpoints = checkpoint::add_checkpoint(&r.milestone.checkpoints, &draft)?;
            Ok(Milestone {
                checkpoints,
                updated_at: now,
                ..r.milestone.clone()
            })
        })
        .await?;

    tracing::info!(
        milestone_id = %id,
        checkpoints = record.milestone.checkpoints.len(),
        "Checkpoint added",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: record.milestone.checkpoints,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// PUT /api/v1/milestones/{id}/checkpoints/{checkpoint_id}
///
/// Merge a partial edit into one checkpoint; 404 if either id is unknown.
pub async fn update_checkpoint(
    State(state): State<AppState>,
    Path((id, checkpoint_id)): Path<(EntityId, EntityId)>,
    Json(patch): Json<CheckpointPatch>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let record = state
        .store
        .update_with(id, None, |r| {
            let checkpoints =
                checkpoint::update_checkpoint(&r.milestone.checkpoints, checkpoint_id, &patch)?;
            Ok(Milestone {
                checkpoints,
                updated_at: now,
                ..r.milestone.clone()
            })
        })
        .await?;

    if let Some(status) = patch.status {
        tracing::info!(
            milestone_id = %id,
            checkpoint_id = %checkpoint_id,
            status = status.as_str(),
            "Checkpoint status set",
        );
    }

    Ok(Json(DataResponse {
        data: record.milestone.checkpoints,
    }))
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

/// DELETE /api/v1/milestones/{id}/checkpoints/{checkpoint_id}
///
/// Idempotent: deleting an absent checkpoint still returns 200 with the
/// current list. Caller-side confirmation dialogs are a UI concern; the
/// engine simply accepts the delete.
pub async fn remove_checkpoint(
    State(state): State<AppState>,
    Path((id, checkpoint_id)): Path<(EntityId, EntityId)>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let record = state
        .store
        .update_with(id, None, |r| {
            let checkpoints: Vec<Checkpoint> =
                checkpoint::remove_checkpoint(&r.milestone.checkpoints, checkpoint_id);
            Ok(Milestone {
                checkpoints,
                updated_at: now,
                ..r.milestone.clone()
            })
        })
        .await?;

    tracing::info!(milestone_id = %id, checkpoint_id = %checkpoint_id, "Checkpoint removed");

    Ok(Json(DataResponse {
        data: record.milestone.checkpoints,
    }))
}
