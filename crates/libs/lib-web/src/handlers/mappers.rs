//! Store models → wire DTOs.

use lib_core::model::{Conversation, ConversationStats, Message, Page};
use shared::dto::{
    ConversationListResponse, ConversationResponse, ConversationStatsResponse, MessageListResponse,
    MessageMetadataResponse, MessageResponse, Pagination,
};

pub fn conversation(conversation: Conversation) -> ConversationResponse {
    ConversationResponse {
        id: conversation.id,
        title: conversation.title,
        message_count: conversation.message_count,
        status: conversation.status.to_string(),
        created_at: conversation.created_at,
        updated_at: conversation.updated_at,
    }
}

pub fn conversation_list(page: Page<Conversation>) -> ConversationListResponse {
    ConversationListResponse {
        pagination: Pagination::new(page.total, page.page, page.limit),
        conversations: page.items.into_iter().map(conversation).collect(),
    }
}

pub fn stats(stats: ConversationStats) -> ConversationStatsResponse {
    ConversationStatsResponse {
        total_active: stats.total_active,
        total_archived: stats.total_archived,
        total: stats.total(),
    }
}

pub fn message(message: Message) -> MessageResponse {
    let metadata = message.metadata().map(|m| MessageMetadataResponse {
        model: m.model.clone(),
        tokens_used: m.tokens_used,
        processing_time: m.processing_time_ms,
    });

    MessageResponse {
        id: message.id,
        conversation_id: message.conversation_id,
        role: message.role.to_string(),
        content: message.content,
        metadata,
        created_at: message.created_at,
    }
}

pub fn message_list(page: Page<Message>) -> MessageListResponse {
    MessageListResponse {
        pagination: Pagination::new(page.total, page.page, page.limit),
        messages: page.items.into_iter().map(message).collect(),
    }
}
