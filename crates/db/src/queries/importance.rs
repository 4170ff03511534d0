// crates/db/src/queries/importance.rs
// Importance declarations: written once per user, copied into the snapshot
// by every applied event.

use super::row_types::ImportanceRow;
use crate::{Database, DbError, DbResult};
use career_log_core::ids::{generate_id, IMPORTANCE_PREFIX};
use career_log_core::{Dimensions, SatisfactionImportance};
use chrono::Utc;

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

impl Database {
    /// Store the user's importance weights. Fails with `AlreadyExists` on a second declaration.
    pub async fn insert_importance(
        &self,
        user_id: &str,
        weights: &Dimensions,
    ) -> DbResult<SatisfactionImportance> {
        let now = Utc::now();
        let importance = SatisfactionImportance {
            id: generate_id(IMPORTANCE_PREFIX),
            user_id: user_id.to_string(),
            weights: *weights,
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO job_satisfaction_importances (
                id, user_id,
                workload, compensation, growth,
                work_environment, work_relationships, work_values,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&importance.id)
        .bind(user_id)
        .bind(weights.workload)
        .bind(weights.compensation)
        .bind(weights.growth)
        .bind(weights.work_environment)
        .bind(weights.work_relationships)
        .bind(weights.work_values)
        .bind(now.timestamp())
        .bind(now.timestamp())
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(importance),
            Err(e) if is_unique_violation(&e) => Err(DbError::AlreadyExists {
                entity: "importance",
                user_id: user_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the user's importance declaration, if any.
    pub async fn get_importance(&self, user_id: &str) -> DbResult<Option<SatisfactionImportance>> {
        let row: Option<ImportanceRow> =
            sqlx::query_as("SELECT * FROM job_satisfaction_importances WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;
        row.map(ImportanceRow::into_importance).transpose()
    }
}
