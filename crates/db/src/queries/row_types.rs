// crates/db/src/queries/row_types.rs
// Internal row types and transaction-accepting helper functions.

use crate::{DbError, DbResult};
use career_log_core::{
    ChatMessage, ConversationRecord, Dimensions, EventKind, NewSatisfactionEvent,
    SatisfactionEvent, SatisfactionImportance, SatisfactionSnapshot,
};
use chrono::{DateTime, Utc};
use sqlx::Row;

pub(crate) type SqliteTx<'c> = sqlx::Transaction<'c, sqlx::Sqlite>;

pub(crate) fn from_unix(table: &'static str, secs: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DbError::invalid_row(table, format!("timestamp out of range: {secs}")))
}

fn dimensions_from_row(
    row: &sqlx::sqlite::SqliteRow,
    suffix: &str,
) -> Result<Dimensions, sqlx::Error> {
    Ok(Dimensions {
        workload: row.try_get(format!("workload{suffix}").as_str())?,
        compensation: row.try_get(format!("compensation{suffix}").as_str())?,
        growth: row.try_get(format!("growth{suffix}").as_str())?,
        work_environment: row.try_get(format!("work_environment{suffix}").as_str())?,
        work_relationships: row.try_get(format!("work_relationships{suffix}").as_str())?,
        work_values: row.try_get(format!("work_values{suffix}").as_str())?,
    })
}

// ============================================================================
// job_satisfactions
// ============================================================================

#[derive(Debug)]
pub(crate) struct SnapshotRow {
    id: String,
    user_id: String,
    levels: Dimensions,
    importance: Dimensions,
    created_at: i64,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for SnapshotRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            levels: dimensions_from_row(row, "")?,
            importance: dimensions_from_row(row, "_importance")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl SnapshotRow {
    pub(crate) fn into_snapshot(self) -> DbResult<SatisfactionSnapshot> {
        Ok(SatisfactionSnapshot {
            id: self.id,
            user_id: self.user_id,
            levels: self.levels,
            importance: self.importance,
            created_at: from_unix("job_satisfactions", self.created_at)?,
            updated_at: from_unix("job_satisfactions", self.updated_at)?,
        })
    }
}

pub(crate) async fn fetch_snapshot_tx(
    tx: &mut SqliteTx<'_>,
    user_id: &str,
) -> DbResult<Option<SatisfactionSnapshot>> {
    let row: Option<SnapshotRow> =
        sqlx::query_as("SELECT * FROM job_satisfactions WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    row.map(SnapshotRow::into_snapshot).transpose()
}

pub(crate) async fn insert_snapshot_tx(
    tx: &mut SqliteTx<'_>,
    snapshot: &SatisfactionSnapshot,
) -> DbResult<()> {
    let l = &snapshot.levels;
    let w = &snapshot.importance;
    sqlx::query(
        r#"
        INSERT INTO job_satisfactions (
            id, user_id,
            workload, compensation, growth,
            work_environment, work_relationships, work_values,
            workload_importance, compensation_importance, growth_importance,
            work_environment_importance, work_relationships_importance, work_values_importance,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
        "#,
    )
    .bind(&snapshot.id)
    .bind(&snapshot.user_id)
    .bind(l.workload)
    .bind(l.compensation)
    .bind(l.growth)
    .bind(l.work_environment)
    .bind(l.work_relationships)
    .bind(l.work_values)
    .bind(w.workload)
    .bind(w.compensation)
    .bind(w.growth)
    .bind(w.work_environment)
    .bind(w.work_relationships)
    .bind(w.work_values)
    .bind(snapshot.created_at.timestamp())
    .bind(snapshot.updated_at.timestamp())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub(crate) async fn update_snapshot_tx(
    tx: &mut SqliteTx<'_>,
    snapshot: &SatisfactionSnapshot,
) -> DbResult<()> {
    let l = &snapshot.levels;
    let w = &snapshot.importance;
    sqlx::query(
        r#"
        UPDATE job_satisfactions SET
            workload = ?2,
            compensation = ?3,
            growth = ?4,
            work_environment = ?5,
            work_relationships = ?6,
            work_values = ?7,
            workload_importance = ?8,
            compensation_importance = ?9,
            growth_importance = ?10,
            work_environment_importance = ?11,
            work_relationships_importance = ?12,
            work_values_importance = ?13,
            updated_at = ?14
        WHERE id = ?1
        "#,
    )
    .bind(&snapshot.id)
    .bind(l.workload)
    .bind(l.compensation)
    .bind(l.growth)
    .bind(l.work_environment)
    .bind(l.work_relationships)
    .bind(l.work_values)
    .bind(w.workload)
    .bind(w.compensation)
    .bind(w.growth)
    .bind(w.work_environment)
    .bind(w.work_relationships)
    .bind(w.work_values)
    .bind(snapshot.updated_at.timestamp())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ============================================================================
// job_satisfaction_importances
// ============================================================================

#[derive(Debug)]
pub(crate) struct ImportanceRow {
    id: String,
    user_id: String,
    weights: Dimensions,
    created_at: i64,
    updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for ImportanceRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            weights: dimensions_from_row(row, "")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl ImportanceRow {
    pub(crate) fn into_importance(self) -> DbResult<SatisfactionImportance> {
        Ok(SatisfactionImportance {
            id: self.id,
            user_id: self.user_id,
            weights: self.weights,
            created_at: from_unix("job_satisfaction_importances", self.created_at)?,
            updated_at: from_unix("job_satisfaction_importances", self.updated_at)?,
        })
    }
}

pub(crate) async fn fetch_importance_tx(
    tx: &mut SqliteTx<'_>,
    user_id: &str,
) -> DbResult<Option<SatisfactionImportance>> {
    let row: Option<ImportanceRow> =
        sqlx::query_as("SELECT * FROM job_satisfaction_importances WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    row.map(ImportanceRow::into_importance).transpose()
}

// ============================================================================
// job_satisfaction_events
// ============================================================================

#[derive(Debug)]
pub(crate) struct EventRow {
    seq: i64,
    id: String,
    user_id: String,
    event_type: String,
    deltas: Dimensions,
    source_id: Option<String>,
    created_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for EventRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            seq: row.try_get("seq")?,
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            event_type: row.try_get("event_type")?,
            deltas: dimensions_from_row(row, "")?,
            source_id: row.try_get("source_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl EventRow {
    pub(crate) fn into_event(self) -> DbResult<SatisfactionEvent> {
        let kind: EventKind = self
            .event_type
            .parse()
            .map_err(|e| DbError::invalid_row("job_satisfaction_events", format!("{e}")))?;
        Ok(SatisfactionEvent {
            id: self.id,
            seq: self.seq,
            user_id: self.user_id,
            kind,
            deltas: self.deltas,
            source_id: self.source_id,
            created_at: from_unix("job_satisfaction_events", self.created_at)?,
        })
    }
}

/// Append one event row. Returns the assigned sequence number.
pub(crate) async fn insert_event_tx(
    tx: &mut SqliteTx<'_>,
    id: &str,
    event: &NewSatisfactionEvent,
) -> DbResult<i64> {
    let d = &event.deltas;
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO job_satisfaction_events (
            id, user_id, event_type,
            workload, compensation, growth,
            work_environment, work_relationships, work_values,
            source_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        RETURNING seq
        "#,
    )
    .bind(id)
    .bind(&event.user_id)
    .bind(event.kind.as_str())
    .bind(d.workload)
    .bind(d.compensation)
    .bind(d.growth)
    .bind(d.work_environment)
    .bind(d.work_relationships)
    .bind(d.work_values)
    .bind(event.source_id.as_deref())
    .bind(event.created_at.timestamp())
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.0)
}

// ============================================================================
// chat_sets
// ============================================================================

#[derive(Debug)]
pub(crate) struct ConversationRow {
    id: String,
    user_id: String,
    title: String,
    chat_data: String,
    created_at: i64,
    deleted_at: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for ConversationRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            chat_data: row.try_get("chat_data")?,
            created_at: row.try_get("created_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

impl ConversationRow {
    pub(crate) fn into_record(self) -> DbResult<ConversationRecord> {
        let messages: Vec<ChatMessage> = serde_json::from_str(&self.chat_data).map_err(|e| {
            DbError::invalid_row("chat_sets", format!("chat_data of {}: {e}", self.id))
        })?;
        let created_at = DateTime::from_timestamp(self.created_at, 0).ok_or_else(|| {
            DbError::invalid_row(
                "chat_sets",
                format!("created_at of {}: out of range: {}", self.id, self.created_at),
            )
        })?;
        Ok(ConversationRecord {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            messages,
            created_at,
            deleted_at: self
                .deleted_at
                .map(|secs| from_unix("chat_sets", secs))
                .transpose()?,
        })
    }
}
