//! Draft validation for milestones.
//!
//! All rules are independent and every failure is collected, so callers get
//! a complete field-keyed report rather than the first offender. Pure
//! functions of their input; "today" is passed in by the caller because the
//! engine has no clock.

use chrono::NaiveDate;

use crate::error::ValidationReport;
use crate::milestone::{
    MilestoneDraft, MilestoneSettings, Requirement, AUTO_CLOSE_MAX_DAYS, AUTO_CLOSE_MIN_DAYS,
    MAX_RESUBMISSIONS_CAP,
};

/// Validate a milestone draft's shape: strings, due date, requirements, and
/// settings bounds.
///
/// The rubric has its own validator in [`crate::rubric`]; the lifecycle
/// controller combines both reports for the full create/update check.
pub fn validate_milestone_draft(draft: &MilestoneDraft, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::new();

    if draft.name.trim().is_empty() {
        report.push("name", "Name is required");
    }
    if draft.description.trim().is_empty() {
        report.push("description", "Description is required");
    }

    match draft.due_date {
        None => report.push("dueDate", "Due date is required"),
        Some(due) if due < today => {
            report.push("dueDate", "Due date must not be in the past");
        }
        Some(_) => {}
    }

    validate_requirements(&draft.requirements, &mut report);
    validate_settings(&draft.settings, &mut report);

    report
}

/// Per-requirement checks, keyed `requirement_{i}_title` and
/// `requirement_{i}_description`. An empty requirement is an error, never
/// silently dropped.
pub(crate) fn validate_requirements(requirements: &[Requirement], report: &mut ValidationReport) {
    for (i, req) in requirements.iter().enumerate() {
        if req.title.trim().is_empty() {
            report.push(
                format!("requirement_{i}_title"),
                "Requirement title is required",
            );
        }
        if req.description.trim().is_empty() {
            report.push(
                format!("requirement_{i}_description"),
                "Requirement description is required",
            );
        }
    }
}

fn validate_settings(settings: &MilestoneSettings, report: &mut ValidationReport) {
    if settings.max_resubmissions > MAX_RESUBMISSIONS_CAP {
        report.push(
            "maxResubmissions",
            format!("Max resubmissions must be between 0 and {MAX_RESUBMISSIONS_CAP}"),
        );
    }
    if !(AUTO_CLOSE_MIN_DAYS..=AUTO_CLOSE_MAX_DAYS).contains(&settings.auto_close_after_days) {
        report.push(
            "autoCloseAfterDays",
            format!(
                "Auto-close window must be between {AUTO_CLOSE_MIN_DAYS} and {AUTO_CLOSE_MAX_DAYS} days"
            ),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
