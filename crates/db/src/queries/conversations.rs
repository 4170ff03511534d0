// crates/db/src/queries/conversations.rs
// Conversation records (chat_sets). The analysis side only reads them;
// the writers here serve the chat collaborator and tests.

use super::row_types::ConversationRow;
use crate::{Database, DbError, DbResult};
use career_log_core::ids::{generate_id, CHAT_SET_PREFIX};
use career_log_core::{ChatMessage, ConversationRecord};
use chrono::{DateTime, Utc};

fn encode_messages(messages: &[ChatMessage]) -> DbResult<String> {
    serde_json::to_string(messages)
        .map_err(|e| DbError::invalid_row("chat_sets", format!("encode chat_data: {e}")))
}

impl Database {
    /// Store a new conversation created at `created_at`.
    pub async fn insert_conversation(
        &self,
        user_id: &str,
        title: &str,
        messages: Vec<ChatMessage>,
        created_at: DateTime<Utc>,
    ) -> DbResult<ConversationRecord> {
        let record = ConversationRecord {
            id: generate_id(CHAT_SET_PREFIX),
            user_id: user_id.to_string(),
            title: title.to_string(),
            messages,
            created_at,
            deleted_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO chat_sets (id, user_id, title, chat_data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.title)
        .bind(encode_messages(&record.messages)?)
        .bind(created_at.timestamp())
        .execute(self.pool())
        .await?;

        Ok(record)
    }

    /// Mark a conversation deleted. Deleted conversations are never analyzed.
    pub async fn soft_delete_conversation(&self, conversation_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE chat_sets SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(conversation_id)
        .bind(Utc::now().timestamp())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Get one conversation by id, including soft-deleted ones.
    pub async fn get_conversation(&self, conversation_id: &str) -> DbResult<Option<ConversationRecord>> {
        let row: Option<ConversationRow> = sqlx::query_as("SELECT * FROM chat_sets WHERE id = ?1")
            .bind(conversation_id)
            .fetch_optional(self.pool())
            .await?;
        row.map(ConversationRow::into_record).transpose()
    }

    /// Live conversations with `start <= created_at < end`, oldest first.
    ///
    /// Each row is decoded on its own: a corrupt row yields an `InvalidRow`
    /// entry in place and does not hide the rows around it.
    pub async fn list_conversations_in_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<DbResult<ConversationRecord>>> {
        let rows: Vec<ConversationRow> = sqlx::query_as(
            r#"
            SELECT * FROM chat_sets
            WHERE created_at >= ?1 AND created_at < ?2 AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(start.timestamp())
        .bind(end.timestamp())
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(ConversationRow::into_record).collect())
    }
}
