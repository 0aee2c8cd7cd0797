//! Periodic auto-close sweep for overdue milestones.
//!
//! The engine only exposes a pure predicate (`check_auto_close`); this
//! task supplies the clock and the write. Runs on a fixed interval using
//! `tokio::time::interval` until cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use praxis_core::lifecycle;
use praxis_core::types::Timestamp;

use crate::store::MilestoneStore;

/// Run the auto-close sweep loop until `cancel` is triggered.
pub async fn run(store: Arc<MilestoneStore>, sweep_interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = sweep_interval.as_secs(),
        "Auto-close sweep started"
    );

    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Auto-close sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let closed = sweep(&store, Utc::now()).await;
                if closed > 0 {
                    tracing::info!(closed, "Auto-close sweep: closed overdue milestones");
                } else {
                    tracing::debug!("Auto-close sweep: nothing to close");
                }
            }
        }
    }
}

/// Close every open milestone whose auto-close window has elapsed at
/// `now`. Returns the number of milestones closed.
///
/// Each close runs as its own store cycle; a milestone closed in between
/// (by a user or a competing sweep) surfaces as a `Conflict` and is
/// skipped.
pub async fn sweep(store: &MilestoneStore, now: Timestamp) -> usize {
    let mut closed = 0usize;

    for record in store.list().await {
        if !lifecycle::check_auto_close(&record.milestone, now) {
            continue;
        }
        let id = record.milestone.id;
        match store
            .update_with(id, None, |r| lifecycle::close(&r.milestone, now))
            .await
        {
            Ok(_) => {
                closed += 1;
                tracing::info!(milestone_id = %id, "Milestone auto-closed");
            }
            Err(e) => {
                tracing::debug!(milestone_id = %id, error = %e, "Auto-close skipped");
            }
        }
    }

    closed
}
