//! # Store Traits
//!
//! Seams between persistence and the chat core. The SQLite repositories
//! implement these; tests substitute their own.

use async_trait::async_trait;

use super::models::{
    Conversation, ConversationStats, ConversationStatus, Message, MessageMetadata, MessageRole, Page,
};
use crate::Result;

/// Ordered messages per conversation.
///
/// Appending or deleting a message also adjusts the owning conversation's
/// `message_count` and `updated_at`.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Store a new message. `NotFound` if the conversation does not exist.
    async fn append(
        &self,
        conversation_id: &str,
        role: MessageRole,
        content: &str,
        metadata: Option<MessageMetadata>,
    ) -> Result<Message>;

    /// Up to `limit` most recent messages, returned oldest first.
    async fn recent_history(&self, conversation_id: &str, limit: i64) -> Result<Vec<Message>>;

    /// A page of messages, oldest first. `NotFound` if the conversation does not exist.
    async fn list_page(&self, conversation_id: &str, page: i64, limit: i64) -> Result<Page<Message>>;

    /// Most recent message, if any.
    async fn last(&self, conversation_id: &str) -> Result<Option<Message>>;

    async fn find(&self, message_id: &str) -> Result<Message>;

    /// Delete a message belonging to `conversation_id`.
    async fn delete(&self, conversation_id: &str, message_id: &str) -> Result<()>;
}

/// Conversation metadata.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a conversation; `None` gets a dated default title.
    async fn create(&self, title: Option<&str>) -> Result<Conversation>;

    async fn find(&self, conversation_id: &str) -> Result<Conversation>;

    /// Most recently updated first, optionally filtered by status.
    async fn list(
        &self,
        page: i64,
        limit: i64,
        status: Option<ConversationStatus>,
    ) -> Result<Page<Conversation>>;

    async fn update_title(&self, conversation_id: &str, title: &str) -> Result<Conversation>;

    async fn archive(&self, conversation_id: &str) -> Result<Conversation>;

    /// Delete a conversation together with its messages.
    async fn delete(&self, conversation_id: &str) -> Result<()>;

    async fn stats(&self) -> Result<ConversationStats>;
}
