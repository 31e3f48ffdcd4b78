//! # Message Handlers
//!
//! Message history of one conversation. Storing a message here does not
//! trigger a reply; use the chat endpoint or the WebSocket for that.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lib_core::model::{validate_user_content, MessageRole, MessageStore};
use lib_core::Result;
use shared::dto::{MessageListResponse, MessageResponse, PageQuery, SendMessageRequest, SendMessageResponse};
use std::sync::Arc;
use tracing::info;

use super::{json_body, mappers};

pub const DEFAULT_MESSAGE_PAGE_LIMIT: i64 = 50;

/// `POST /conversations/{id}/messages`. Stores a user message, 201.
pub async fn send_message(
    State(messages): State<Arc<dyn MessageStore>>,
    Path(conversation_id): Path<String>,
    payload: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SendMessageResponse>)> {
    let request = json_body(payload)?;
    validate_user_content(&request.content)?;

    let message = messages
        .append(&conversation_id, MessageRole::User, &request.content, None)
        .await?;
    info!(conversation_id = %conversation_id, message_id = %message.id, "[MESSAGES] User message stored");

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            user_message: mappers::message(message),
            conversation_id,
        }),
    ))
}

/// `GET /conversations/{id}/messages?page&limit`, oldest first.
pub async fn list_messages(
    State(messages): State<Arc<dyn MessageStore>>,
    Path(conversation_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<MessageListResponse>> {
    let page = messages
        .list_page(
            &conversation_id,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_MESSAGE_PAGE_LIMIT),
        )
        .await?;

    Ok(Json(mappers::message_list(page)))
}

/// `GET /conversations/{id}/messages/last`. `null` for an empty conversation.
pub async fn last_message(
    State(messages): State<Arc<dyn MessageStore>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Option<MessageResponse>>> {
    let last = messages.last(&conversation_id).await?;
    Ok(Json(last.map(mappers::message)))
}

pub async fn delete_message(
    State(messages): State<Arc<dyn MessageStore>>,
    Path((conversation_id, message_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    messages.delete(&conversation_id, &message_id).await?;
    info!(conversation_id = %conversation_id, message_id = %message_id, "[MESSAGES] Deleted");
    Ok(StatusCode::NO_CONTENT)
}
