//! # Conversation Handlers
//!
//! CRUD over conversation metadata. Message bodies live under
//! [`messages`](super::messages).

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lib_core::model::{ConversationStatus, ConversationStore};
use lib_core::{AppError, Result};
use shared::dto::{
    ConversationListResponse, ConversationResponse, ConversationStatsResponse, CreateConversationRequest,
    ListConversationsQuery, UpdateTitleRequest,
};
use std::sync::Arc;
use tracing::info;

use super::{json_body, mappers};

pub const DEFAULT_CONVERSATION_PAGE_LIMIT: i64 = 20;

/// `POST /conversations`. An empty body creates an untitled conversation.
pub async fn create_conversation(
    State(conversations): State<Arc<dyn ConversationStore>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ConversationResponse>)> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateConversationRequest::default()
    } else {
        serde_json::from_slice::<CreateConversationRequest>(&body)?
    };

    let conversation = conversations.create(request.title.as_deref()).await?;
    info!(conversation_id = %conversation.id, "[CONVERSATIONS] Created");

    Ok((StatusCode::CREATED, Json(mappers::conversation(conversation))))
}

/// `GET /conversations?page&limit&status`
pub async fn list_conversations(
    State(conversations): State<Arc<dyn ConversationStore>>,
    Query(query): Query<ListConversationsQuery>,
) -> Result<Json<ConversationListResponse>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ConversationStatus>)
        .transpose()
        .map_err(AppError::InvalidInput)?;

    let page = conversations
        .list(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_CONVERSATION_PAGE_LIMIT),
            status,
        )
        .await?;

    Ok(Json(mappers::conversation_list(page)))
}

pub async fn conversation_stats(
    State(conversations): State<Arc<dyn ConversationStore>>,
) -> Result<Json<ConversationStatsResponse>> {
    let stats = conversations.stats().await?;
    Ok(Json(mappers::stats(stats)))
}

pub async fn get_conversation(
    State(conversations): State<Arc<dyn ConversationStore>>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let conversation = conversations.find(&id).await?;
    Ok(Json(mappers::conversation(conversation)))
}

pub async fn update_title(
    State(conversations): State<Arc<dyn ConversationStore>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateTitleRequest>, JsonRejection>,
) -> Result<Json<ConversationResponse>> {
    let request = json_body(payload)?;
    let conversation = conversations.update_title(&id, request.title.trim()).await?;
    info!(conversation_id = %id, "[CONVERSATIONS] Title updated");
    Ok(Json(mappers::conversation(conversation)))
}

pub async fn archive_conversation(
    State(conversations): State<Arc<dyn ConversationStore>>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let conversation = conversations.archive(&id).await?;
    info!(conversation_id = %id, "[CONVERSATIONS] Archived");
    Ok(Json(mappers::conversation(conversation)))
}

/// `DELETE /conversations/{id}`. Messages go with it.
pub async fn delete_conversation(
    State(conversations): State<Arc<dyn ConversationStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    conversations.delete(&id).await?;
    info!(conversation_id = %id, "[CONVERSATIONS] Deleted");
    Ok(StatusCode::NO_CONTENT)
}
