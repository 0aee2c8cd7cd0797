//! Response envelopes and view models.
//!
//! All API responses use a `{ "data": ... }` envelope. Milestone endpoints
//! return [`MilestoneView`]: the stored fields plus the engine-derived
//! status readings and the store-owned bookkeeping, assembled at response
//! time so derived values are never persisted.

use chrono::NaiveDate;
use serde::Serialize;

use praxis_core::checkpoint::{self, CheckpointSummary};
use praxis_core::lifecycle::{self, MilestoneState};
use praxis_core::milestone::Milestone;

use crate::store::MilestoneRecord;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Milestone representation returned by every milestone endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneView {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub state: MilestoneState,
    pub completion_percentage: u8,
    pub is_ready_to_close: bool,
    pub is_overdue: bool,
    pub checkpoint_summary: CheckpointSummary,
    pub version: u64,
    pub resubmission_count: u32,
}

impl MilestoneView {
    /// Assemble the view, deriving status fields against `today`.
    pub fn from_record(record: &MilestoneRecord, today: NaiveDate) -> Self {
        let milestone = record.milestone.clone();
        Self {
            state: lifecycle::derive_state(&milestone),
            completion_percentage: lifecycle::completion_percentage(&milestone),
            is_ready_to_close: lifecycle::is_ready_to_close(&milestone),
            is_overdue: lifecycle::is_overdue(&milestone, today),
            checkpoint_summary: checkpoint::summarize(&milestone.checkpoints),
            version: record.version,
            resubmission_count: record.resubmission_count,
            milestone,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use praxis_core::milestone::{MilestoneDraft, MilestoneSettings, MilestoneType};
    use praxis_core::types::EntityId;

    fn record() -> MilestoneRecord {
        let draft = MilestoneDraft {
            project_id: EntityId::new_v4(),
            name: "Sprint demo".to_string(),
            description: "Demo the sprint result".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 20),
            milestone_type: MilestoneType::Deliverable,
            requirements: Vec::new(),
            evaluation: Default::default(),
            persona_ids: vec![EntityId::new_v4()],
            settings: MilestoneSettings::default(),
        };
        let milestone = lifecycle::create(
            &draft,
            Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        )
        .unwrap();
        MilestoneRecord {
            milestone,
            version: 1,
            resubmission_count: 0,
        }
    }

    #[test]
    fn view_flattens_milestone_and_adds_derived_fields() {
        let view = MilestoneView::from_record(&record(), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        let json = serde_json::to_value(&view).unwrap();

        // Flattened milestone fields sit next to the derived ones.
        assert!(json.get("name").is_some());
        assert_eq!(json["state"], "open");
        assert_eq!(json["completionPercentage"], 0);
        assert_eq!(json["isReadyToClose"], false);
        assert_eq!(json["isOverdue"], false);
        assert_eq!(json["checkpointSummary"]["total"], 0);
        assert_eq!(json["version"], 1);
        assert_eq!(json["resubmissionCount"], 0);
    }

    #[test]
    fn view_marks_overdue_after_due_date() {
        let view = MilestoneView::from_record(&record(), NaiveDate::from_ymd_opt(2026, 3, 21).unwrap());
        assert!(view.is_overdue);
    }
}
