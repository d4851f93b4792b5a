//! # Message Repository
//!
//! Messages between employees and customers.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use pressline_core::Message;

const MESSAGE_COLUMNS: &str = "id, sender_id, recipient_id, content, sent_at";

/// Repository for messages.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MessageRepository { pool }
    }

    /// Sends a message.
    pub async fn send(&self, sender_id: i64, recipient_id: i64, content: &str) -> DbResult<Message> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO messages (sender_id, recipient_id, content, sent_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Message", id))
    }

    /// Messages a user sent or received, newest first.
    pub async fn list_for(&self, user_id: i64) -> DbResult<Vec<Message>> {
        Ok(sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE sender_id = ?1 OR recipient_id = ?1
            ORDER BY sent_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_send_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.messages().send(1, 2, "Your order is ready").await.unwrap();
        db.messages().send(2, 1, "Thanks, coming by at 5").await.unwrap();

        let for_one = db.messages().list_for(1).await.unwrap();
        assert_eq!(for_one.len(), 2);
        assert_eq!(for_one[0].content, "Thanks, coming by at 5");

        let for_three = db.messages().list_for(3).await.unwrap();
        assert!(for_three.is_empty());
    }
}
