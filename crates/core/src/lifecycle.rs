//! Milestone-level orchestration of validation, rubric, sign-off, and
//! checkpoint rules.
//!
//! Everything here is snapshot-in, snapshot-out: operations never mutate
//! their input, never touch storage, and never read the wall clock —
//! callers pass `now` and `today` explicitly. A draft that fails validation
//! never becomes a `Milestone` value, so the "invalid draft" state of the
//! domain is unrepresentable outside the error channel.

use chrono::{Days, NaiveDate};

use crate::error::CoreError;
use crate::milestone::{Milestone, MilestoneDraft, MilestonePatch, MilestoneSettings};
use crate::rubric;
use crate::signoff::{self, SignOffDecision};
use crate::types::{EntityId, Timestamp};
use crate::validation;

// ---------------------------------------------------------------------------
// Derived state
// ---------------------------------------------------------------------------

/// Aggregate milestone state, derived from closure and approval quorum.
/// Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneState {
    /// Valid and accepting work; the approval quorum is not yet met.
    Open,
    /// The quorum configured in settings is satisfied; closing is now a
    /// caller decision.
    ReadyToClose,
    /// Terminal.
    Closed,
}

/// Derive the aggregate state from a milestone's parts.
pub fn derive_state(milestone: &Milestone) -> MilestoneState {
    if milestone.closed_at.is_some() {
        MilestoneState::Closed
    } else if is_ready_to_close(milestone) {
        MilestoneState::ReadyToClose
    } else {
        MilestoneState::Open
    }
}

/// Whether the approval quorum configured in settings is satisfied.
///
/// This flag feeds the closure decision; it does not itself close anything.
pub fn is_ready_to_close(milestone: &Milestone) -> bool {
    signoff::is_complete(
        &milestone.persona_sign_offs,
        milestone.settings.require_all_persona_approvals,
    )
}

/// Share of approved sign-offs, rounded to the nearest integer percent.
pub fn completion_percentage(milestone: &Milestone) -> u8 {
    signoff::completion_percentage(&milestone.persona_sign_offs)
}

/// Whether the due date has passed without the milestone being closed.
pub fn is_overdue(milestone: &Milestone, today: NaiveDate) -> bool {
    milestone.closed_at.is_none() && milestone.due_date < today
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create a milestone from a draft.
///
/// Runs the full shape and rubric validation; on success assigns a fresh
/// id, initializes one pending sign-off per required persona, and starts
/// with no checkpoints.
pub fn create(
    draft: &MilestoneDraft,
    now: Timestamp,
    today: NaiveDate,
) -> Result<Milestone, CoreError> {
    let mut report = validation::validate_milestone_draft(draft, today);
    report.extend(rubric::validate_rubric(&draft.evaluation.rubric));
    report.into_result()?;

    let Some(due_date) = draft.due_date else {
        return Err(CoreError::Validation(
            crate::error::ValidationReport::single("dueDate", "Due date is required"),
        ));
    };

    Ok(Milestone {
        id: EntityId::new_v4(),
        project_id: draft.project_id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        due_date,
        milestone_type: draft.milestone_type,
        requirements: draft.requirements.clone(),
        evaluation: draft.evaluation.clone(),
        persona_sign_offs: signoff::initialize(&draft.persona_ids),
        settings: draft.settings,
        checkpoints: Vec::new(),
        created_at: now,
        updated_at: now,
        closed_at: None,
    })
}

/// Merge `patch` into `milestone` and re-validate the merged whole.
///
/// Partial patches are never validated in isolation — the rubric-sum
/// invariant spans the entire criteria list, so only the merged result is
/// meaningful. Sign-offs are reconciled against the (possibly updated)
/// required-persona set: retained personas keep their decisions, new ones
/// start pending.
pub fn update(
    milestone: &Milestone,
    patch: &MilestonePatch,
    now: Timestamp,
    today: NaiveDate,
) -> Result<Milestone, CoreError> {
    let required_ids: Vec<EntityId> = match &patch.persona_ids {
        Some(ids) => ids.clone(),
        None => milestone
            .persona_sign_offs
            .iter()
            .map(|s| s.persona_id)
            .collect(),
    };

    let merged = MilestoneDraft {
        project_id: milestone.project_id,
        name: patch.name.clone().unwrap_or_else(|| milestone.name.clone()),
        description: patch
            .description
            .clone()
            .unwrap_or_else(|| milestone.description.clone()),
        due_date: Some(patch.due_date.unwrap_or(milestone.due_date)),
        milestone_type: patch.milestone_type.unwrap_or(milestone.milestone_type),
        requirements: patch
            .requirements
            .clone()
            .unwrap_or_else(|| milestone.requirements.clone()),
        evaluation: patch
            .evaluation
            .clone()
            .unwrap_or_else(|| milestone.evaluation.clone()),
        persona_ids: required_ids.clone(),
        settings: patch.settings.unwrap_or(milestone.settings),
    };

    let mut report = validation::validate_milestone_draft(&merged, today);
    report.extend(rubric::validate_rubric(&merged.evaluation.rubric));
    report.into_result()?;

    Ok(Milestone {
        id: milestone.id,
        project_id: milestone.project_id,
        name: merged.name,
        description: merged.description,
        due_date: merged.due_date.unwrap_or(milestone.due_date),
        milestone_type: merged.milestone_type,
        requirements: merged.requirements,
        evaluation: merged.evaluation,
        persona_sign_offs: signoff::sync_with_required(&milestone.persona_sign_offs, &required_ids),
        settings: merged.settings,
        checkpoints: milestone.checkpoints.clone(),
        created_at: milestone.created_at,
        updated_at: now,
        closed_at: milestone.closed_at,
    })
}

/// Record a persona's sign-off decision on the milestone.
///
/// Completion percentage and readiness are recomputed by readers from the
/// returned value; nothing is persisted here.
pub fn record_sign_off(
    milestone: &Milestone,
    persona_id: EntityId,
    decision: &SignOffDecision,
    now: Timestamp,
) -> Result<Milestone, CoreError> {
    let persona_sign_offs =
        signoff::record_decision(&milestone.persona_sign_offs, persona_id, decision)?;

    Ok(Milestone {
        persona_sign_offs,
        updated_at: now,
        ..milestone.clone()
    })
}

/// Explicit terminal transition.
///
/// Closing is always a caller action (a user request or the auto-close
/// sweep); the engine only rejects a second close.
pub fn close(milestone: &Milestone, now: Timestamp) -> Result<Milestone, CoreError> {
    if milestone.closed_at.is_some() {
        return Err(CoreError::Conflict(format!(
            "Milestone {} is already closed",
            milestone.id
        )));
    }

    Ok(Milestone {
        closed_at: Some(now),
        updated_at: now,
        ..milestone.clone()
    })
}

/// Guard for a resubmission request.
///
/// The resubmission counter is owned by the caller's persistence layer
/// (submission history lives outside this engine); only the policy bounds
/// are enforced here.
pub fn request_resubmission(
    settings: &MilestoneSettings,
    resubmission_count: u32,
) -> Result<(), CoreError> {
    if !settings.allow_resubmission {
        return Err(CoreError::LimitExceeded(
            "Resubmission is not allowed for this milestone".to_string(),
        ));
    }
    if resubmission_count >= settings.max_resubmissions {
        return Err(CoreError::LimitExceeded(format!(
            "Resubmission limit of {} reached",
            settings.max_resubmissions
        )));
    }
    Ok(())
}

/// Whether the auto-close window has elapsed for a still-open milestone.
///
/// Pure predicate evaluated against a caller-supplied clock; actually
/// closing the milestone is the caller's write operation.
pub fn check_auto_close(milestone: &Milestone, now: Timestamp) -> bool {
    if milestone.closed_at.is_some() {
        return false;
    }
    match milestone
        .due_date
        .checked_add_days(Days::new(u64::from(milestone.settings.auto_close_after_days)))
    {
        Some(deadline) => now.date_naive() > deadline,
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
