// crates/db/src/queries/satisfaction.rs
// Satisfaction update engine and snapshot/event reads.

use super::row_types::{
    fetch_importance_tx, fetch_snapshot_tx, insert_event_tx, insert_snapshot_tx,
    update_snapshot_tx, EventRow, SnapshotRow,
};
use crate::{Database, DbError, DbResult};
use career_log_core::ids::{generate_id, JOB_SATISFACTION_PREFIX, SATISFACTION_EVENT_PREFIX};
use career_log_core::{EventKind, NewSatisfactionEvent, SatisfactionEvent, SatisfactionSnapshot};
use chrono::Utc;
use tracing::debug;

/// Events returned by [`Database::list_satisfaction_events`] when no limit is given.
pub const DEFAULT_EVENT_LIMIT: i64 = 50;
/// Upper bound on a single event history page.
pub const MAX_EVENT_LIMIT: i64 = 500;

impl Database {
    /// Apply one satisfaction event to the user's snapshot.
    ///
    /// The event row and the snapshot row are written in one transaction:
    /// either both land or neither does. The event is inserted first so the
    /// transaction holds the write lock before it reads the snapshot.
    ///
    /// An `INIT_EVENT` creates the snapshot from zero; callers check for an
    /// existing snapshot beforehand, and a duplicate fails on the unique
    /// `user_id` constraint. Any other event requires an existing snapshot
    /// and fails with [`DbError::NotInitialized`] otherwise.
    pub async fn apply_satisfaction_event(
        &self,
        event: &NewSatisfactionEvent,
    ) -> DbResult<SatisfactionSnapshot> {
        let mut tx = self.pool().begin().await?;

        let event_id = generate_id(SATISFACTION_EVENT_PREFIX);
        let seq = insert_event_tx(&mut tx, &event_id, event).await?;

        let now = Utc::now();
        let mut snapshot = match event.kind {
            EventKind::Init => SatisfactionSnapshot::empty(
                generate_id(JOB_SATISFACTION_PREFIX),
                event.user_id.clone(),
                now,
            ),
            EventKind::ChatAnalysis => fetch_snapshot_tx(&mut tx, &event.user_id)
                .await?
                .ok_or_else(|| DbError::NotInitialized {
                    user_id: event.user_id.clone(),
                })?,
        };

        snapshot.apply_deltas(&event.deltas);
        if let Some(importance) = fetch_importance_tx(&mut tx, &event.user_id).await? {
            snapshot.importance = importance.weights;
        }
        snapshot.updated_at = now;

        match event.kind {
            EventKind::Init => insert_snapshot_tx(&mut tx, &snapshot).await?,
            EventKind::ChatAnalysis => update_snapshot_tx(&mut tx, &snapshot).await?,
        }

        tx.commit().await?;

        debug!(
            user_id = %event.user_id,
            event_kind = %event.kind,
            event_id = %event_id,
            seq,
            "satisfaction event applied"
        );
        Ok(snapshot)
    }

    /// Get the current snapshot for a user, if initialized.
    pub async fn get_satisfaction(&self, user_id: &str) -> DbResult<Option<SatisfactionSnapshot>> {
        let row: Option<SnapshotRow> =
            sqlx::query_as("SELECT * FROM job_satisfactions WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;
        row.map(SnapshotRow::into_snapshot).transpose()
    }

    /// Whether the user already has a snapshot.
    pub async fn satisfaction_exists(&self, user_id: &str) -> DbResult<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM job_satisfactions WHERE user_id = ?1)")
                .bind(user_id)
                .fetch_one(self.pool())
                .await?;
        Ok(row.0 != 0)
    }

    /// List a user's events, newest first. `limit` is clamped to [1, MAX_EVENT_LIMIT].
    pub async fn list_satisfaction_events(
        &self,
        user_id: &str,
        limit: i64,
    ) -> DbResult<Vec<SatisfactionEvent>> {
        let limit = limit.clamp(1, MAX_EVENT_LIMIT);
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT * FROM job_satisfaction_events
            WHERE user_id = ?1
            ORDER BY created_at DESC, seq DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(EventRow::into_event).collect()
    }

    /// Count all events recorded for a user.
    pub async fn count_satisfaction_events(&self, user_id: &str) -> DbResult<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM job_satisfaction_events WHERE user_id = ?1")
                .bind(user_id)
                .fetch_one(self.pool())
                .await?;
        Ok(row.0)
    }
}
