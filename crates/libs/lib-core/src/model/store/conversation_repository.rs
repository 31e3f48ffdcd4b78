//! # Conversation Repository
//!
//! SQLite implementation of [`ConversationStore`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use lib_core::model::store::{create_pool, migrate, ConversationRepository, ConversationStore};
//!
//! # async fn example() -> lib_core::Result<()> {
//! let pool = create_pool("sqlite::memory:").await?;
//! migrate(&pool).await?;
//!
//! let conversations = ConversationRepository::new(pool);
//! let created = conversations.create(Some("Debate")).await?;
//! let found = conversations.find(&created.id).await?;
//! assert_eq!(found.title, "Debate");
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::Utc;
use lib_utils::{format_short_date_time, validate_char_range, validate_not_empty};
use sqlx::query_as;
use uuid::Uuid;

use super::models::{
    Conversation, ConversationStats, ConversationStatus, Page, PageWindow, TITLE_MAX_CHARS,
};
use super::traits::ConversationStore;
use super::DbPool;
use crate::{AppError, Result};

/// Conversation repository backed by the `conversations` table.
#[derive(Clone)]
pub struct ConversationRepository {
    pool: DbPool,
}

impl ConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn not_found(conversation_id: &str) -> AppError {
        AppError::NotFound(format!("Conversation {} not found", conversation_id))
    }

    fn validate_title(title: &str) -> Result<()> {
        validate_not_empty(title, "Title").map_err(AppError::InvalidInput)?;
        validate_char_range(title, 1, TITLE_MAX_CHARS, "Title").map_err(AppError::InvalidInput)
    }

    /// Title used when the client does not supply one, e.g. `Conversa 07/03/2025 às 09:05`.
    pub fn default_title() -> String {
        format!("Conversa {}", format_short_date_time(Utc::now()))
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn create(&self, title: Option<&str>) -> Result<Conversation> {
        let title = match title.map(str::trim) {
            Some(t) => {
                Self::validate_title(t)?;
                t.to_string()
            }
            None => Self::default_title(),
        };

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            title,
            message_count: 0,
            status: ConversationStatus::Active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO conversations (id, title, message_count, status, created_at, updated_at)
            VALUES (?1, ?2, 0, ?3, ?4, ?5)
            "#,
        )
        .bind(&conversation.id)
        .bind(&conversation.title)
        .bind(conversation.status.to_string())
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(conversation_id = %conversation.id, "[STORE] Conversation created");

        Ok(conversation)
    }

    async fn find(&self, conversation_id: &str) -> Result<Conversation> {
        query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(conversation_id))
    }

    async fn list(
        &self,
        page: i64,
        limit: i64,
        status: Option<ConversationStatus>,
    ) -> Result<Page<Conversation>> {
        let window = PageWindow::new(page, limit);
        let status = status.map(|s| s.to_string());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM conversations WHERE (?1 IS NULL OR status = ?1)",
        )
        .bind(&status)
        .fetch_one(&self.pool)
        .await?;

        let items = query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE (?1 IS NULL OR status = ?1)
            ORDER BY updated_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(&status)
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total, page: window.page, limit: window.limit })
    }

    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<Conversation> {
        let title = title.trim();
        Self::validate_title(title)?;

        let result = sqlx::query("UPDATE conversations SET title = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(title)
            .bind(Utc::now())
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(conversation_id));
        }

        self.find(conversation_id).await
    }

    async fn archive(&self, conversation_id: &str) -> Result<Conversation> {
        let result = sqlx::query("UPDATE conversations SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(ConversationStatus::Archived.to_string())
            .bind(Utc::now())
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(conversation_id));
        }

        tracing::info!(conversation_id = %conversation_id, "[STORE] Conversation archived");
        self.find(conversation_id).await
    }

    async fn delete(&self, conversation_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(conversation_id));
        }

        tracing::info!(conversation_id = %conversation_id, "[STORE] Conversation deleted");
        Ok(())
    }

    async fn stats(&self) -> Result<ConversationStats> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM conversations GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut stats = ConversationStats { total_active: 0, total_archived: 0 };
        for (status, count) in rows {
            match status.parse::<ConversationStatus>() {
                Ok(ConversationStatus::Active) => stats.total_active = count,
                Ok(ConversationStatus::Archived) => stats.total_archived = count,
                Err(e) => tracing::warn!("[STORE] Skipping unknown status in stats: {}", e),
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::test_support::setup_test_db;

    #[tokio::test]
    async fn test_create_with_default_title() {
        // Arrange
        let repo = ConversationRepository::new(setup_test_db().await);

        // Act
        let conversation = repo.create(None).await.unwrap();

        // Assert
        assert!(conversation.title.starts_with("Conversa "));
        assert!(conversation.title.contains(" às "));
        assert_eq!(conversation.message_count, 0);
        assert_eq!(conversation.status, ConversationStatus::Active);
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let repo = ConversationRepository::new(setup_test_db().await);

        let title = "x".repeat(TITLE_MAX_CHARS + 1);
        let result = repo.create(Some(&title)).await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_find_missing_conversation_is_not_found() {
        let repo = ConversationRepository::new(setup_test_db().await);

        let err = repo.find("missing").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m == "Conversation missing not found"));
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_paginates() {
        // Arrange
        let repo = ConversationRepository::new(setup_test_db().await);
        let first = repo.create(Some("first")).await.unwrap();
        repo.create(Some("second")).await.unwrap();
        repo.create(Some("third")).await.unwrap();
        repo.archive(&first.id).await.unwrap();

        // Act
        let active = repo.list(1, 1, Some(ConversationStatus::Active)).await.unwrap();
        let all = repo.list(1, 10, None).await.unwrap();

        // Assert
        assert_eq!(active.total, 2);
        assert_eq!(active.items.len(), 1);
        assert_eq!(all.total, 3);
        // Archiving bumped updated_at, so it sorts first
        assert_eq!(all.items[0].id, first.id);
    }

    #[tokio::test]
    async fn test_list_clamps_out_of_range_paging() {
        // Arrange
        let repo = ConversationRepository::new(setup_test_db().await);
        repo.create(Some("only")).await.unwrap();

        // Act
        let clamped = repo.list(0, 500, None).await.unwrap();
        let far = repo.list(i64::MAX, 100, None).await.unwrap();

        // Assert
        assert_eq!((clamped.page, clamped.limit), (1, 100));
        assert_eq!(clamped.items.len(), 1);
        assert_eq!(far.total, 1);
        assert!(far.items.is_empty());
    }

    #[tokio::test]
    async fn test_update_title_and_stats() {
        let repo = ConversationRepository::new(setup_test_db().await);
        let c = repo.create(Some("old")).await.unwrap();
        repo.create(None).await.unwrap();

        let renamed = repo.update_title(&c.id, "  new  ").await.unwrap();
        repo.archive(&c.id).await.unwrap();
        let stats = repo.stats().await.unwrap();

        assert_eq!(renamed.title, "new");
        assert_eq!(stats, ConversationStats { total_active: 1, total_archived: 1 });
        assert_eq!(stats.total(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_conversation_is_not_found() {
        let repo = ConversationRepository::new(setup_test_db().await);

        let result = repo.delete("nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
