//! # Chat Handlers
//!
//! Blocking chat turns over HTTP and the generation backend health probe.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use lib_core::Result;
use shared::dto::{AiHealthResponse, ChatReplyResponse, SendMessageRequest};
use tracing::info;

use super::json_body;
use crate::chat::ChatService;

/// `POST /conversations/{id}/chat`. Stores the message, waits for the reply.
pub async fn chat_reply(
    State(chat): State<ChatService>,
    Path(conversation_id): Path<String>,
    payload: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ChatReplyResponse>> {
    let request = json_body(payload)?;

    let result = chat.process_message(&conversation_id, &request.content).await?;
    info!(
        conversation_id = %conversation_id,
        duration_ms = result.processing_time_ms,
        "[CHAT] Reply over HTTP"
    );

    Ok(Json(ChatReplyResponse {
        user_message_id: result.user_message_id,
        assistant_message_id: result.assistant_message_id,
        content: result.content,
        processing_time: result.processing_time_ms,
    }))
}

/// `GET /health/ai`. Always 200; the body says whether the backend answered.
pub async fn ai_health(State(chat): State<ChatService>) -> Json<AiHealthResponse> {
    let health = chat.ai().health_check().await;
    Json(AiHealthResponse {
        status: health.status.to_string(),
        model: health.model,
        configured: health.configured,
    })
}
