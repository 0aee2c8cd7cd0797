//! Checkpoint management: ordered sub-deliverables inside a milestone.
//!
//! Checkpoints exist only on an already-created milestone; the operations
//! here work on the milestone's `checkpoints` list as a value and return a
//! new list. Insertion order is preserved — display-time sorting, if any,
//! is a caller concern.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationReport};
use crate::milestone::Requirement;
use crate::signoff::{self, SignOff};
use crate::types::{DueDate, EntityId};
use crate::validation;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Checkpoint progress state.
///
/// `Overdue` is set by the caller's scheduler from a wall-clock comparison
/// against the due date; the engine has no background clock and never sets
/// it on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckpointStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl CheckpointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

/// A sub-deliverable nested in a milestone, with its own due date, status,
/// and sign-offs tracked independently of the parent's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub due_date: DueDate,
    pub status: CheckpointStatus,
    pub persona_sign_offs: Vec<SignOff>,
    pub requirements: Vec<Requirement>,
}

/// Input for adding a checkpoint to an existing milestone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<DueDate>,
    /// Personas whose sign-off the checkpoint requires; each gets a fresh
    /// pending entry.
    #[serde(default)]
    pub persona_ids: Vec<EntityId>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

/// Partial edit of one checkpoint; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DueDate>,
    /// Any of the four states may be set directly.
    pub status: Option<CheckpointStatus>,
}

/// Aggregate checkpoint progress, computed for milestone views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Append a new checkpoint built from `draft`.
///
/// Requires a non-empty title and description and a due date; failures are
/// reported field-keyed and collected, not fail-fast. The new checkpoint
/// starts pending with a freshly generated id.
pub fn add_checkpoint(
    checkpoints: &[Checkpoint],
    draft: &CheckpointDraft,
) -> Result<Vec<Checkpoint>, CoreError> {
    let mut report = ValidationReport::new();
    if draft.title.trim().is_empty() {
        report.push("title", "Title is required");
    }
    if draft.description.trim().is_empty() {
        report.push("description", "Description is required");
    }
    if draft.due_date.is_none() {
        report.push("dueDate", "Due date is required");
    }
    validation::validate_requirements(&draft.requirements, &mut report);
    report.into_result()?;

    let Some(due_date) = draft.due_date else {
        return Err(CoreError::Validation(ValidationReport::single(
            "dueDate",
            "Due date is required",
        )));
    };

    let mut next = checkpoints.to_vec();
    next.push(Checkpoint {
        id: EntityId::new_v4(),
        title: draft.title.clone(),
        description: draft.description.clone(),
        due_date,
        status: CheckpointStatus::Pending,
        persona_sign_offs: signoff::initialize(&draft.persona_ids),
        requirements: draft.requirements.clone(),
    });
    Ok(next)
}

/// Merge `patch` into the checkpoint with the given id.
///
/// Fails with `NotFound` for an unknown id and rejects a patch that blanks
/// the title or description.
pub fn update_checkpoint(
    checkpoints: &[Checkpoint],
    id: EntityId,
    patch: &CheckpointPatch,
) -> Result<Vec<Checkpoint>, CoreError> {
    if !checkpoints.iter().any(|c| c.id == id) {
        return Err(CoreError::NotFound {
            entity: "Checkpoint",
            id,
        });
    }

    let mut report = ValidationReport::new();
    if matches!(&patch.title, Some(t) if t.trim().is_empty()) {
        report.push("title", "Title is required");
    }
    if matches!(&patch.description, Some(d) if d.trim().is_empty()) {
        report.push("description", "Description is required");
    }
    report.into_result()?;

    Ok(checkpoints
        .iter()
        .map(|c| {
            if c.id == id {
                Checkpoint {
                    id: c.id,
                    title: patch.title.clone().unwrap_or_else(|| c.title.clone()),
                    description: patch
                        .description
                        .clone()
                        .unwrap_or_else(|| c.description.clone()),
                    due_date: patch.due_date.unwrap_or(c.due_date),
                    status: patch.status.unwrap_or(c.status),
                    persona_sign_offs: c.persona_sign_offs.clone(),
                    requirements: c.requirements.clone(),
                }
            } else {
                c.clone()
            }
        })
        .collect())
}

/// Remove the checkpoint with the given id.
///
/// Idempotent: an absent id is a no-op, never an error, so repeated delete
/// calls cannot corrupt state.
pub fn remove_checkpoint(checkpoints: &[Checkpoint], id: EntityId) -> Vec<Checkpoint> {
    checkpoints
        .iter()
        .filter(|c| c.id != id)
        .cloned()
        .collect()
}

/// Count checkpoints per status.
pub fn summarize(checkpoints: &[Checkpoint]) -> CheckpointSummary {
    let mut pending = 0usize;
    let mut in_progress = 0usize;
    let mut completed = 0usize;
    let mut overdue = 0usize;

    for c in checkpoints {
        match c.status {
            CheckpointStatus::Pending => pending += 1,
            CheckpointStatus::InProgress => in_progress += 1,
            CheckpointStatus::Completed => completed += 1,
            CheckpointStatus::Overdue => overdue += 1,
        }
    }

    CheckpointSummary {
        total: checkpoints.len(),
        pending,
        in_progress,
        completed,
        overdue,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
