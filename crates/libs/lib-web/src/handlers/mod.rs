//! # HTTP Request Handlers
//!
//! Axum handlers for the REST API, organized by resource, plus the `/chat`
//! WebSocket upgrade.
//!
//! ## Handler Modules
//!
//! - **[`conversations`]**: conversation CRUD
//!   - `POST   /api/conversations` - Create (optional title)
//!   - `GET    /api/conversations` - List, newest activity first
//!   - `GET    /api/conversations/stats` - Active/archived counts
//!   - `GET    /api/conversations/{id}` - Get one
//!   - `PATCH  /api/conversations/{id}/title` - Rename
//!   - `PATCH  /api/conversations/{id}/archive` - Archive
//!   - `DELETE /api/conversations/{id}` - Delete with its messages
//!
//! - **[`messages`]**: message history
//!   - `POST   /api/conversations/{id}/messages` - Store a user message
//!   - `GET    /api/conversations/{id}/messages` - List, oldest first
//!   - `GET    /api/conversations/{id}/messages/last` - Latest message or `null`
//!   - `DELETE /api/conversations/{id}/messages/{message_id}` - Delete
//!
//! - **[`chat`]**: AI turns over plain HTTP
//!   - `POST /api/conversations/{id}/chat` - Run one turn and wait for the reply
//!   - `GET  /api/health/ai` - Generation backend probe
//!
//! - **[`websocket`]**: `GET /chat` upgrade for streamed chat
//!
//! ## Error Handling
//!
//! Handlers return [`lib_core::Result`]; [`AppError`] renders itself as
//! `{"error": "...", "code": "..."}` with the matching status code.

pub mod chat;
pub mod conversations;
pub mod mappers;
pub mod messages;
pub mod websocket;

#[cfg(test)]
mod tests;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use lib_core::{AppError, Result};

/// Unwrap a JSON body, reporting malformed or unexpected fields as `InvalidInput`.
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}
