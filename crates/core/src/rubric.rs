//! Rubric criteria validation and weight accounting.
//!
//! The central numeric invariant of the engine lives here: a non-empty
//! rubric's weights must sum to 100% within [`WEIGHT_TOLERANCE`].

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ValidationReport};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Required sum of all criteria weights when a rubric is present.
pub const WEIGHT_TOTAL: f64 = 100.0;

/// Allowed deviation from [`WEIGHT_TOTAL`] when summing floating-point
/// weights.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// Error message for the aggregate weight invariant (wire contract).
pub const WEIGHT_SUM_MESSAGE: &str = "Rubric criteria weights must sum to 100%";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One weighted, scorable evaluation dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricCriterion {
    pub criterion: String,
    /// In `(0, 100]`.
    pub weight: f64,
    /// At least 1.
    pub max_score: i32,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Sum of all criteria weights.
///
/// Pure read used by callers to render live feedback while a rubric is
/// edited; performs no validation itself.
pub fn weight_total(criteria: &[RubricCriterion]) -> f64 {
    criteria.iter().map(|c| c.weight).sum()
}

/// Validate per-criterion bounds and the aggregate weight invariant.
///
/// An empty rubric is valid — a milestone may have no formal rubric.
/// Errors are keyed `rubric_{i}_criterion`, `rubric_{i}_description`,
/// `rubric_{i}_weight`, `rubric_{i}_maxScore`, and `rubricWeight` for the
/// aggregate.
pub fn validate_rubric(criteria: &[RubricCriterion]) -> Vec<FieldError> {
    let mut report = ValidationReport::new();

    for (i, c) in criteria.iter().enumerate() {
        if c.criterion.trim().is_empty() {
            report.push(format!("rubric_{i}_criterion"), "Criterion name is required");
        }
        if c.description.trim().is_empty() {
            report.push(
                format!("rubric_{i}_description"),
                "Criterion description is required",
            );
        }
        if c.weight <= 0.0 || c.weight > WEIGHT_TOTAL {
            report.push(
                format!("rubric_{i}_weight"),
                "Weight must be greater than 0 and at most 100",
            );
        }
        if c.max_score < 1 {
            report.push(format!("rubric_{i}_maxScore"), "Max score must be at least 1");
        }
    }

    if !criteria.is_empty() && (weight_total(criteria) - WEIGHT_TOTAL).abs() > WEIGHT_TOLERANCE {
        report.push("rubricWeight", WEIGHT_SUM_MESSAGE);
    }

    report.errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
