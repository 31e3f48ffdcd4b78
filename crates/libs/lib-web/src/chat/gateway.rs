//! # Chat Gateway
//!
//! Socket protocol for streamed chat, independent of the transport: the
//! WebSocket handler feeds inbound frames in and drains [`ServerEvent`]s out
//! of an `mpsc` channel.
//!
//! ## Protocol
//!
//! ```text
//! Unattached --join(C)--> Attached(C) --leave--> Unattached
//!                         Attached(C) --join(D)--> Attached(D)
//! any state --disconnect--> (removed)
//! ```
//!
//! `send:message` is only accepted while attached to the named conversation.
//! An accepted message produces, in order:
//!
//! ```text
//! ai:typing{true}  message:saved  ai:response:stream*  ai:response:complete  ai:typing{false}
//! ```
//!
//! or, on failure, `ai:typing{false}` followed by `error`.

use futures_util::StreamExt;
use lib_core::model::validate_user_content;
use shared::dto::socket::{
    ClientEvent, ConversationRef, MembershipPayload, MessageSavedPayload, ResponseCompletePayload,
    SendMessagePayload, ServerEvent, StreamChunkPayload,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::service::{ChatService, StreamingEvent};
use super::sessions::SessionRegistry;

pub const JOINED_MESSAGE: &str = "Successfully joined conversation";
pub const LEFT_MESSAGE: &str = "Successfully left conversation";
pub const NOT_JOINED_MESSAGE: &str = "You must join the conversation first";
pub const JOIN_FAILED_MESSAGE: &str = "Failed to join conversation";
pub const PROCESS_FAILED_MESSAGE: &str = "Failed to process message";
pub const INVALID_FRAME_MESSAGE: &str = "Invalid event";
pub const INVALID_MESSAGE_MESSAGE: &str = "Invalid message";

pub struct ChatGateway {
    chat: ChatService,
    sessions: SessionRegistry,
}

impl ChatGateway {
    pub fn new(chat: ChatService) -> Self {
        Self {
            chat,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Register a connection. Starts unattached.
    pub async fn connect(&self) -> String {
        let connection_id = self.sessions.register().await;
        info!(client_id = %connection_id, "[WS] Session opened");
        connection_id
    }

    /// Forget the connection. Stored messages are untouched.
    pub async fn disconnect(&self, connection_id: &str) {
        let state = self.sessions.remove(connection_id).await;
        info!(client_id = %connection_id, state = ?state, "[WS] Session closed");
    }

    /// Parse a raw text frame and handle it. Malformed frames get an `error` event.
    pub async fn handle_frame(&self, connection_id: &str, frame: &str, out: &mpsc::Sender<ServerEvent>) {
        match serde_json::from_str::<ClientEvent>(frame) {
            Ok(event) => self.handle_event(connection_id, event, out).await,
            Err(e) => {
                warn!(client_id = %connection_id, error = %e, "[WS] Malformed frame");
                send(out, ServerEvent::error(INVALID_FRAME_MESSAGE, Some(e.to_string()))).await;
            }
        }
    }

    pub async fn handle_event(&self, connection_id: &str, event: ClientEvent, out: &mpsc::Sender<ServerEvent>) {
        match event {
            ClientEvent::JoinConversation(ConversationRef { conversation_id }) => {
                self.join(connection_id, &conversation_id, out).await
            }
            ClientEvent::LeaveConversation(_) => self.leave(connection_id, out).await,
            ClientEvent::SendMessage(payload) => self.send_message(connection_id, payload, out).await,
        }
    }

    async fn join(&self, connection_id: &str, conversation_id: &str, out: &mpsc::Sender<ServerEvent>) {
        match self.chat.probe_conversation(conversation_id).await {
            Ok(true) => {
                if !self.sessions.attach(connection_id, conversation_id).await {
                    debug!(client_id = %connection_id, "[WS] Join after disconnect ignored");
                    return;
                }
                info!(
                    client_id = %connection_id,
                    conversation_id = %conversation_id,
                    "[WS] Joined conversation"
                );
                send(
                    out,
                    ServerEvent::JoinedConversation(MembershipPayload {
                        conversation_id: conversation_id.to_string(),
                        message: JOINED_MESSAGE.to_string(),
                    }),
                )
                .await;
            }
            Ok(false) => {
                send(out, ServerEvent::error(format!("Conversation {} not found", conversation_id), None)).await;
            }
            Err(e) => {
                send(out, ServerEvent::error(JOIN_FAILED_MESSAGE, Some(e.to_string()))).await;
            }
        }
    }

    async fn leave(&self, connection_id: &str, out: &mpsc::Sender<ServerEvent>) {
        if let Some(conversation_id) = self.sessions.detach(connection_id).await {
            info!(
                client_id = %connection_id,
                conversation_id = %conversation_id,
                "[WS] Left conversation"
            );
            send(
                out,
                ServerEvent::LeftConversation(MembershipPayload {
                    conversation_id,
                    message: LEFT_MESSAGE.to_string(),
                }),
            )
            .await;
        }
    }

    async fn send_message(&self, connection_id: &str, payload: SendMessagePayload, out: &mpsc::Sender<ServerEvent>) {
        let SendMessagePayload { conversation_id, message } = payload;

        if !self.sessions.is_attached_to(connection_id, &conversation_id).await {
            warn!(
                client_id = %connection_id,
                conversation_id = %conversation_id,
                "[WS] Send rejected, not joined"
            );
            send(out, ServerEvent::error(NOT_JOINED_MESSAGE, None)).await;
            return;
        }

        if let Err(e) = validate_user_content(&message) {
            send(out, ServerEvent::error(INVALID_MESSAGE_MESSAGE, Some(e.user_message()))).await;
            return;
        }

        if !send(out, ServerEvent::typing(&conversation_id, true)).await {
            return;
        }

        let mut stream = self.chat.process_message_stream(&conversation_id, &message);
        loop {
            // Stop pulling (and so cancel generation) as soon as the socket side is gone.
            let next = tokio::select! {
                biased;
                _ = out.closed() => {
                    debug!(client_id = %connection_id, "[WS] Outbound closed mid-stream");
                    return;
                }
                next = stream.next() => next,
            };

            let event = match next {
                Some(Ok(StreamingEvent::UserMessageSaved { message_id })) => {
                    ServerEvent::MessageSaved(MessageSavedPayload {
                        conversation_id: conversation_id.clone(),
                        message_id,
                    })
                }
                Some(Ok(StreamingEvent::Chunk(chunk))) => ServerEvent::AiResponseStream(StreamChunkPayload {
                    conversation_id: conversation_id.clone(),
                    chunk,
                }),
                Some(Ok(StreamingEvent::Complete(result))) => {
                    send(
                        out,
                        ServerEvent::AiResponseComplete(ResponseCompletePayload {
                            conversation_id: conversation_id.clone(),
                            message_id: result.assistant_message_id,
                            content: result.content,
                            processing_time: result.processing_time_ms,
                        }),
                    )
                    .await;
                    send(out, ServerEvent::typing(&conversation_id, false)).await;
                    return;
                }
                Some(Err(e)) => {
                    send(out, ServerEvent::typing(&conversation_id, false)).await;
                    send(out, ServerEvent::error(PROCESS_FAILED_MESSAGE, Some(e.to_string()))).await;
                    return;
                }
                None => {
                    // Producer ended without a verdict; only happens if it was cancelled.
                    send(out, ServerEvent::typing(&conversation_id, false)).await;
                    return;
                }
            };

            if !send(out, event).await {
                return;
            }
        }
    }
}

/// `false` once the outbound side is closed.
async fn send(out: &mpsc::Sender<ServerEvent>, event: ServerEvent) -> bool {
    debug!(event = event.name(), "[WS] Emit");
    out.send(event).await.is_ok()
}
