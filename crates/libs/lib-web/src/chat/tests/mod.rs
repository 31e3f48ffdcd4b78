//! Chat service and gateway tests over an in-memory database.


use async_trait::async_trait;
use lib_ai::AiService;
use lib_core::model::store::{ConversationRepository, MessageRepository};
use lib_core::model::{Message, MessageMetadata, MessageRole, MessageStore, Page};
use lib_core::{AppError, Result};
use std::sync::Arc;

use super::service::ChatService;
use crate::test_support::{setup_test_db, ScriptedGenerator};

pub(super) struct Fixture {
    pub conversations: Arc<ConversationRepository>,
    pub messages: Arc<MessageRepository>,
    pub chat: ChatService,
}

pub(super) async fn fixture(generator: ScriptedGenerator) -> Fixture {
    let db = setup_test_db().await;
    let conversations = Arc::new(ConversationRepository::new(db.clone()));
    let messages = Arc::new(MessageRepository::new(db));
    let ai = AiService::new(Arc::new(generator), None);
    let chat = ChatService::new(messages.clone(), ai, 50);

    Fixture { conversations, messages, chat }
}

/// Every read fails as if the database were unreachable.
pub(super) struct UnreachableMessageStore;

#[async_trait]
impl MessageStore for UnreachableMessageStore {
    async fn append(
        &self,
        _conversation_id: &str,
        _role: MessageRole,
        _content: &str,
        _metadata: Option<MessageMetadata>,
    ) -> Result<Message> {
        Err(unreachable_db())
    }

    async fn recent_history(&self, _conversation_id: &str, _limit: i64) -> Result<Vec<Message>> {
        Err(unreachable_db())
    }

    async fn list_page(&self, _conversation_id: &str, _page: i64, _limit: i64) -> Result<Page<Message>> {
        Err(unreachable_db())
    }

    async fn last(&self, _conversation_id: &str) -> Result<Option<Message>> {
        Err(unreachable_db())
    }

    async fn find(&self, _message_id: &str) -> Result<Message> {
        Err(unreachable_db())
    }

    async fn delete(&self, _conversation_id: &str, _message_id: &str) -> Result<()> {
        Err(unreachable_db())
    }
}

fn unreachable_db() -> AppError {
    AppError::Database("unable to open database file".to_string())
}
