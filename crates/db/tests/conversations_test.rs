//! Integration tests for conversation storage and the analysis-window query.

use career_log_core::{ChatMessage, ConversationRecord, MessageRole};
use career_log_db::{Database, DbError};
use chrono::{DateTime, TimeZone, Utc};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(MessageRole::Assistant, "How was your day?"),
        ChatMessage::new(MessageRole::User, text),
    ]
}

#[tokio::test]
async fn test_insert_and_get_conversation() {
    let db = Database::new_in_memory().await.unwrap();
    let created = db
        .insert_conversation("u", "Tuesday", messages("Long hours again."), at(2024, 1, 1, 12, 0))
        .await
        .unwrap();
    assert!(created.id.starts_with("CH_SET_"));

    let fetched = db.get_conversation(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.user_id, "u");
    assert_eq!(fetched.title, "Tuesday");
    assert_eq!(fetched.messages.len(), 2);
    assert_eq!(fetched.messages[1].content, "Long hours again.");
    assert_eq!(fetched.created_at, at(2024, 1, 1, 12, 0));
    assert!(fetched.deleted_at.is_none());
}

#[tokio::test]
async fn test_window_is_half_open() {
    let db = Database::new_in_memory().await.unwrap();
    let start = at(2023, 12, 31, 21, 0);
    let end = at(2024, 1, 1, 21, 0);

    let at_start = db
        .insert_conversation("u", "start", messages("a"), start)
        .await
        .unwrap();
    let inside = db
        .insert_conversation("u", "inside", messages("b"), at(2024, 1, 1, 3, 0))
        .await
        .unwrap();
    db.insert_conversation("u", "at end", messages("c"), end)
        .await
        .unwrap();
    db.insert_conversation("u", "before", messages("d"), at(2023, 12, 31, 20, 59))
        .await
        .unwrap();

    let found: Vec<ConversationRecord> = db
        .list_conversations_in_window(start, end)
        .await
        .unwrap()
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec![at_start.id.as_str(), inside.id.as_str()]);
}

#[tokio::test]
async fn test_soft_deleted_conversations_are_skipped() {
    let db = Database::new_in_memory().await.unwrap();
    let conv = db
        .insert_conversation("u", "gone", messages("x"), at(2024, 1, 1, 1, 0))
        .await
        .unwrap();

    assert!(db.soft_delete_conversation(&conv.id).await.unwrap());
    assert!(!db.soft_delete_conversation(&conv.id).await.unwrap());

    let found = db
        .list_conversations_in_window(at(2024, 1, 1, 0, 0), at(2024, 1, 2, 0, 0))
        .await
        .unwrap();
    assert!(found.is_empty());

    let fetched = db.get_conversation(&conv.id).await.unwrap().unwrap();
    assert!(fetched.is_deleted());
}

#[tokio::test]
async fn test_corrupt_row_does_not_hide_neighbors() {
    let db = Database::new_in_memory().await.unwrap();
    let first = db
        .insert_conversation("u", "first", messages("a"), at(2024, 1, 1, 1, 0))
        .await
        .unwrap();
    let broken = db
        .insert_conversation("u", "broken", messages("b"), at(2024, 1, 1, 2, 0))
        .await
        .unwrap();
    let last = db
        .insert_conversation("u", "last", messages("c"), at(2024, 1, 1, 3, 0))
        .await
        .unwrap();
    sqlx::query("UPDATE chat_sets SET chat_data = '{' WHERE id = ?1")
        .bind(&broken.id)
        .execute(db.pool())
        .await
        .unwrap();

    let found = db
        .list_conversations_in_window(at(2024, 1, 1, 0, 0), at(2024, 1, 2, 0, 0))
        .await
        .unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(found[0].as_ref().unwrap().id, first.id);
    match &found[1] {
        Err(DbError::InvalidRow { table, reason }) => {
            assert_eq!(*table, "chat_sets");
            assert!(reason.contains(&broken.id), "reason: {reason}");
        }
        other => panic!("expected InvalidRow, got {other:?}"),
    }
    assert_eq!(found[2].as_ref().unwrap().id, last.id);
}
