//! # Message Repository
//!
//! SQLite implementation of [`MessageStore`].
//!
//! Message writes run in a transaction together with the owning
//! conversation's `message_count`/`updated_at` update. Ordering within a
//! conversation is `created_at` ascending, ties broken by insertion order.

use async_trait::async_trait;
use chrono::Utc;
use lib_utils::validate_char_range;
use sqlx::types::Json;
use sqlx::{query_as, Sqlite, Transaction};
use uuid::Uuid;

use super::models::{
    Message, MessageMetadata, MessageRole, Page, PageWindow, STORED_CONTENT_MAX_CHARS,
};
use super::traits::MessageStore;
use super::DbPool;
use crate::{AppError, Result};

const MESSAGE_COLUMNS: &str = "id, conversation_id, role, content, metadata, created_at";

/// Message repository backed by the `messages` table.
#[derive(Clone)]
pub struct MessageRepository {
    pool: DbPool,
}

impl MessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn ensure_conversation(&self, conversation_id: &str) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM conversations WHERE id = ?)")
            .bind(conversation_id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Conversation {} not found", conversation_id)))
        }
    }

    async fn bump_conversation(
        tx: &mut Transaction<'_, Sqlite>,
        conversation_id: &str,
        delta: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET message_count = MAX(message_count + ?1, 0), updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(conversation_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str,
        metadata: Option<MessageMetadata>,
    ) -> Result<Message> {
        validate_char_range(content, 1, STORED_CONTENT_MAX_CHARS, "Content")
            .map_err(AppError::InvalidInput)?;

        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            metadata: metadata.map(Json),
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        // The count update doubles as the existence check.
        if Self::bump_conversation(&mut tx, conversation_id, 1).await? == 0 {
            return Err(AppError::NotFound(format!("Conversation {} not found", conversation_id)));
        }

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&message.metadata)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            conversation_id = %conversation_id,
            message_id = %message.id,
            role = %message.role,
            "[STORE] Message appended"
        );

        Ok(message)
    }

    async fn recent_history(&self, conversation_id: &str, limit: i64) -> Result<Vec<Message>> {
        let sql = format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM (
                SELECT {MESSAGE_COLUMNS}, rowid AS seq FROM messages
                WHERE conversation_id = ?1
                ORDER BY created_at DESC, seq DESC
                LIMIT ?2
            )
            ORDER BY created_at ASC, seq ASC
            "#
        );

        let messages = query_as::<_, Message>(&sql)
            .bind(conversation_id)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    async fn list_page(&self, conversation_id: &str, page: i64, limit: i64) -> Result<Page<Message>> {
        let window = PageWindow::new(page, limit);
        self.ensure_conversation(conversation_id).await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE conversation_id = ?1
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?2 OFFSET ?3
            "#
        );

        let items = query_as::<_, Message>(&sql)
            .bind(conversation_id)
            .bind(window.limit)
            .bind(window.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { items, total, page: window.page, limit: window.limit })
    }

    async fn last(&self, conversation_id: &str) -> Result<Option<Message>> {
        let sql = format!(
            r#"
            SELECT {MESSAGE_COLUMNS} FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            "#
        );

        let message = query_as::<_, Message>(&sql)
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn find(&self, message_id: &str) -> Result<Message> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?");

        query_as::<_, Message>(&sql)
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))
    }

    async fn delete(&self, conversation_id: &str, message_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM messages WHERE id = ?1 AND conversation_id = ?2")
            .bind(message_id)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Message {} not found", message_id)));
        }

        Self::bump_conversation(&mut tx, conversation_id, -1).await?;
        tx.commit().await?;

        tracing::debug!(
            conversation_id = %conversation_id,
            message_id = %message_id,
            "[STORE] Message deleted"
        );

        Ok(())
    }
}
