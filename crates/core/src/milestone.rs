//! Milestone entity types, settings bounds, and input shapes.
//!
//! The milestone exclusively owns its requirements, rubric, settings, and
//! checkpoints; `persona_sign_offs` only reference persona entities owned
//! elsewhere. Wire payloads use camelCase field names (the contract predates
//! this implementation and is preserved for frontend compatibility).

use serde::{Deserialize, Serialize};

use crate::checkpoint::Checkpoint;
use crate::rubric::RubricCriterion;
use crate::signoff::SignOff;
use crate::types::{DueDate, EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Settings bounds
// ---------------------------------------------------------------------------

/// Upper bound on `max_resubmissions` (inclusive).
pub const MAX_RESUBMISSIONS_CAP: u32 = 10;

/// Lower bound on the auto-close window in days (inclusive).
pub const AUTO_CLOSE_MIN_DAYS: u32 = 1;

/// Upper bound on the auto-close window in days (inclusive).
pub const AUTO_CLOSE_MAX_DAYS: u32 = 90;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What kind of deliverable a milestone represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneType {
    Deliverable,
    Review,
    Presentation,
    Feedback,
}

impl MilestoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deliverable => "deliverable",
            Self::Review => "review",
            Self::Presentation => "presentation",
            Self::Feedback => "feedback",
        }
    }
}

/// How a requirement is satisfied by the submitting team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementType {
    File,
    Text,
    Link,
    Presentation,
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

/// One item of work a team must submit for a milestone or checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub title: String,
    pub description: String,
    pub is_required: bool,
    #[serde(rename = "type")]
    pub requirement_type: RequirementType,
}

/// Scoring configuration for a milestone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub rubric: Vec<RubricCriterion>,
}

/// Per-milestone policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSettings {
    /// Unanimous approval quorum when `true`; any single approval otherwise.
    pub require_all_persona_approvals: bool,
    pub allow_resubmission: bool,
    /// In `[0, MAX_RESUBMISSIONS_CAP]`.
    pub max_resubmissions: u32,
    /// In `[AUTO_CLOSE_MIN_DAYS, AUTO_CLOSE_MAX_DAYS]`.
    pub auto_close_after_days: u32,
}

impl Default for MilestoneSettings {
    fn default() -> Self {
        Self {
            require_all_persona_approvals: true,
            allow_resubmission: true,
            max_resubmissions: 3,
            auto_close_after_days: 7,
        }
    }
}

/// A dated deliverable within a project, with requirements, a scoring
/// rubric, and required persona approvals.
///
/// Completion percentage, readiness, and overdue status are derived by
/// [`crate::lifecycle`] readers and never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Immutable after creation.
    pub id: EntityId,
    /// Owning project reference (not owned by the milestone).
    pub project_id: EntityId,
    pub name: String,
    pub description: String,
    pub due_date: DueDate,
    #[serde(rename = "type")]
    pub milestone_type: MilestoneType,
    pub requirements: Vec<Requirement>,
    pub evaluation: Evaluation,
    pub persona_sign_offs: Vec<SignOff>,
    pub settings: MilestoneSettings,
    pub checkpoints: Vec<Checkpoint>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Set by the explicit close operation or the auto-close sweep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<Timestamp>,
}

/// Input for creating a milestone.
///
/// The engine assigns the id, initializes one pending sign-off per entry in
/// `persona_ids`, and starts with no checkpoints (checkpoints are managed
/// only on an existing milestone).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDraft {
    pub project_id: EntityId,
    pub name: String,
    pub description: String,
    /// Optional in the input shape so a missing date is reported as a
    /// validation error rather than a deserialization failure.
    pub due_date: Option<DueDate>,
    #[serde(rename = "type")]
    pub milestone_type: MilestoneType,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub evaluation: Evaluation,
    #[serde(default)]
    pub persona_ids: Vec<EntityId>,
    #[serde(default)]
    pub settings: MilestoneSettings,
}

/// Partial update; absent fields keep their current value.
///
/// Validation always runs on the merged result, never on the patch alone —
/// the rubric-weight invariant spans the whole criteria list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DueDate>,
    #[serde(rename = "type")]
    pub milestone_type: Option<MilestoneType>,
    pub requirements: Option<Vec<Requirement>>,
    pub evaluation: Option<Evaluation>,
    /// Replaces the required-persona set; recorded decisions are kept for
    /// retained personas.
    pub persona_ids: Option<Vec<EntityId>>,
    pub settings: Option<MilestoneSettings>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
