//! In-memory milestone store.
//!
//! The engine is storage-agnostic; this store supplies the piece it leaves
//! to its caller: serialized read-modify-write cycles per milestone id and
//! an optimistic version check. Every mutation runs under one write lock,
//! so concurrent handlers can never interleave inside a cycle.

use std::collections::HashMap;

use tokio::sync::RwLock;

use praxis_core::error::CoreError;
use praxis_core::lifecycle;
use praxis_core::milestone::Milestone;
use praxis_core::types::EntityId;

/// A stored milestone plus the bookkeeping the engine deliberately does
/// not own: the optimistic-concurrency version and the resubmission
/// counter.
#[derive(Debug, Clone)]
pub struct MilestoneRecord {
    pub milestone: Milestone,
    /// Bumped on every write; callers may submit their last-seen value to
    /// detect concurrent modification.
    pub version: u64,
    pub resubmission_count: u32,
}

/// Keyed by milestone id. All operations take `&self`; interior mutability
/// is scoped to the lock.
#[derive(Default)]
pub struct MilestoneStore {
    records: RwLock<HashMap<EntityId, MilestoneRecord>>,
}

impl MilestoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly created milestone at version 1.
    pub async fn insert(&self, milestone: Milestone) -> MilestoneRecord {
        let record = MilestoneRecord {
            milestone,
            version: 1,
            resubmission_count: 0,
        };
        let mut records = self.records.write().await;
        records.insert(record.milestone.id, record.clone());
        record
    }

    pub async fn get(&self, id: EntityId) -> Result<MilestoneRecord, CoreError> {
        let records = self.records.read().await;
        records.get(&id).cloned().ok_or(CoreError::NotFound {
            entity: "Milestone",
            id,
        })
    }

    /// All records, oldest first (stable listing for the API).
    pub async fn list(&self) -> Vec<MilestoneRecord> {
        let records = self.records.read().await;
        let mut all: Vec<MilestoneRecord> = records.values().cloned().collect();
        all.sort_by_key(|r| (r.milestone.created_at, r.milestone.id));
        all
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Apply `mutate` to the stored milestone in one serialized cycle.
    ///
    /// `expected_version`, when supplied, must match the stored version or
    /// the cycle fails with `Conflict` and nothing is written. On success
    /// the version is bumped.
    pub async fn update_with<F>(
        &self,
        id: EntityId,
        expected_version: Option<u64>,
        mutate: F,
    ) -> Result<MilestoneRecord, CoreError>
    where
        F: FnOnce(&MilestoneRecord) -> Result<Milestone, CoreError>,
    {
        let mut records = self.records.write().await;
        let record = records.get(&id).ok_or(CoreError::NotFound {
            entity: "Milestone",
            id,
        })?;

        if let Some(expected) = expected_version {
            if expected != record.version {
                return Err(CoreError::Conflict(format!(
                    "Milestone {id} was modified concurrently (expected version {expected}, found {})",
                    record.version
                )));
            }
        }

        let milestone = mutate(record)?;
        let updated = MilestoneRecord {
            milestone,
            version: record.version + 1,
            resubmission_count: record.resubmission_count,
        };
        records.insert(id, updated.clone());
        Ok(updated)
    }

    /// Run the engine's resubmission guard and bump the counter in the
    /// same serialized cycle.
    pub async fn record_resubmission(&self, id: EntityId) -> Result<MilestoneRecord, CoreError> {
        let mut records = self.records.write().await;
        let record = records.get(&id).ok_or(CoreError::NotFound {
            entity: "Milestone",
            id,
        })?;

        lifecycle::request_resubmission(&record.milestone.settings, record.resubmission_count)?;

        let updated = MilestoneRecord {
            milestone: record.milestone.clone(),
            version: record.version + 1,
            resubmission_count: record.resubmission_count + 1,
        };
        records.insert(id, updated.clone());
        Ok(updated)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};
    use praxis_core::milestone::{MilestoneDraft, MilestoneSettings, MilestoneType};

    fn sample_milestone() -> Milestone {
        let draft = MilestoneDraft {
            project_id: EntityId::new_v4(),
            name: "Sprint demo".to_string(),
            description: "Demo the sprint result".to_string(),
            due_date: NaiveDate::from_ymd_opt(2030, 6, 1),
            milestone_type: MilestoneType::Deliverable,
            requirements: Vec::new(),
            evaluation: Default::default(),
            persona_ids: Vec::new(),
            settings: MilestoneSettings::default(),
        };
        lifecycle::create(
            &draft,
            Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_starts_at_version_one() {
        let store = MilestoneStore::new();
        let record = store.insert(sample_milestone()).await;
        assert_eq!(record.version, 1);
        assert_eq!(record.resubmission_count, 0);
    }

    #[tokio::test]
    async fn get_unknown_id_not_found() {
        let store = MilestoneStore::new();
        assert_matches!(
            store.get(EntityId::new_v4()).await,
            Err(CoreError::NotFound {
                entity: "Milestone",
                ..
            })
        );
    }

    #[tokio::test]
    async fn update_with_bumps_version() {
        let store = MilestoneStore::new();
        let record = store.insert(sample_milestone()).await;
        let id = record.milestone.id;

        let updated = store
            .update_with(id, None, |r| Ok(r.milestone.clone()))
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn stale_version_conflicts_without_writing() {
        let store = MilestoneStore::new();
        let record = store.insert(sample_milestone()).await;
        let id = record.milestone.id;

        let result = store
            .update_with(id, Some(99), |r| Ok(r.milestone.clone()))
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));

        // Nothing was written.
        assert_eq!(store.get(id).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn mutate_error_leaves_record_untouched() {
        let store = MilestoneStore::new();
        let record = store.insert(sample_milestone()).await;
        let id = record.milestone.id;

        let result = store
            .update_with(id, None, |_| {
                Err(CoreError::Conflict("engine said no".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.get(id).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn resubmission_counts_up_to_cap() {
        let store = MilestoneStore::new();
        let record = store.insert(sample_milestone()).await;
        let id = record.milestone.id;
        let cap = record.milestone.settings.max_resubmissions;

        for expected in 1..=cap {
            let updated = store.record_resubmission(id).await.unwrap();
            assert_eq!(updated.resubmission_count, expected);
        }

        assert_matches!(
            store.record_resubmission(id).await,
            Err(CoreError::LimitExceeded(_))
        );
    }

    #[tokio::test]
    async fn list_is_ordered_by_creation() {
        let store = MilestoneStore::new();
        let mut first = sample_milestone();
        first.created_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut second = sample_milestone();
        second.created_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        store.insert(second.clone()).await;
        store.insert(first.clone()).await;

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].milestone.id, first.id);
        assert_eq!(listed[1].milestone.id, second.id);
    }
}
