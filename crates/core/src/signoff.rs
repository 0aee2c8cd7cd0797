//! Per-persona approval tracking for milestones and checkpoints.
//!
//! The same sign-off shape is reused at both levels; checkpoint sign-offs
//! are tracked independently of the parent milestone's. All operations are
//! snapshot-in, snapshot-out.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ValidationReport};
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest accepted satisfaction score (inclusive).
pub const SATISFACTION_MIN: i32 = 1;

/// Highest accepted satisfaction score (inclusive).
pub const SATISFACTION_MAX: i32 = 10;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A persona's decision state on a milestone or checkpoint.
///
/// Transitions are deliberately unordered: any status may move to any other,
/// so a persona can retract an approval or soften a rejection. Policy
/// restrictions on backsliding, if any, belong to the caller's business
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignOffStatus {
    Pending,
    Approved,
    Rejected,
    RequestedChanges,
}

impl SignOffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RequestedChanges => "requested-changes",
        }
    }
}

/// One required persona's approval entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOff {
    /// Reference to a persona entity owned elsewhere; the engine never
    /// creates or deletes personas.
    pub persona_id: EntityId,
    pub status: SignOffStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfaction_score: Option<i32>,
}

impl SignOff {
    /// A fresh pending entry for `persona_id`.
    fn pending(persona_id: EntityId) -> Self {
        Self {
            persona_id,
            status: SignOffStatus::Pending,
            feedback: None,
            satisfaction_score: None,
        }
    }
}

/// The mutable fields of one sign-off entry, as submitted by a persona.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOffDecision {
    pub status: SignOffStatus,
    pub feedback: Option<String>,
    /// In `[SATISFACTION_MIN, SATISFACTION_MAX]` when present.
    pub satisfaction_score: Option<i32>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// One pending entry per required persona, in the given order.
pub fn initialize(persona_ids: &[EntityId]) -> Vec<SignOff> {
    persona_ids.iter().map(|&id| SignOff::pending(id)).collect()
}

/// Replace the matching entry's mutable fields with a new decision.
///
/// Fails with `NotFound` if `persona_id` is not among the required signers
/// and with a `satisfactionScore`-keyed validation error for an
/// out-of-range score.
pub fn record_decision(
    sign_offs: &[SignOff],
    persona_id: EntityId,
    decision: &SignOffDecision,
) -> Result<Vec<SignOff>, CoreError> {
    if !sign_offs.iter().any(|s| s.persona_id == persona_id) {
        return Err(CoreError::NotFound {
            entity: "SignOff",
            id: persona_id,
        });
    }

    if let Some(score) = decision.satisfaction_score {
        if !(SATISFACTION_MIN..=SATISFACTION_MAX).contains(&score) {
            return Err(CoreError::Validation(ValidationReport::single(
                "satisfactionScore",
                format!(
                    "Satisfaction score must be between {SATISFACTION_MIN} and {SATISFACTION_MAX}"
                ),
            )));
        }
    }

    Ok(sign_offs
        .iter()
        .map(|s| {
            if s.persona_id == persona_id {
                SignOff {
                    persona_id,
                    status: decision.status,
                    feedback: decision.feedback.clone(),
                    satisfaction_score: decision.satisfaction_score,
                }
            } else {
                s.clone()
            }
        })
        .collect())
}

/// Share of approved entries, rounded to the nearest integer percent.
/// Zero when the list is empty.
pub fn completion_percentage(sign_offs: &[SignOff]) -> u8 {
    if sign_offs.is_empty() {
        return 0;
    }
    let approved = sign_offs
        .iter()
        .filter(|s| s.status == SignOffStatus::Approved)
        .count();
    ((approved as f64 / sign_offs.len() as f64) * 100.0).round() as u8
}

/// Whether the approval quorum is met.
///
/// With `require_all`, every entry must be approved (vacuously true for an
/// empty list — a milestone with no required personas has nothing left to
/// approve). Otherwise a single approval suffices.
pub fn is_complete(sign_offs: &[SignOff], require_all: bool) -> bool {
    if require_all {
        sign_offs.iter().all(|s| s.status == SignOffStatus::Approved)
    } else {
        sign_offs.iter().any(|s| s.status == SignOffStatus::Approved)
    }
}

/// Reconcile a sign-off list against a new set of required personas.
///
/// Retained personas keep their recorded decision, newly required personas
/// start pending, and personas no longer required drop out. Output order
/// follows `persona_ids`. Removing a sign-off requirement is exactly this:
/// removing the persona from the required list.
pub fn sync_with_required(sign_offs: &[SignOff], persona_ids: &[EntityId]) -> Vec<SignOff> {
    persona_ids
        .iter()
        .map(|&id| {
            sign_offs
                .iter()
                .find(|s| s.persona_id == id)
                .cloned()
                .unwrap_or_else(|| SignOff::pending(id))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
