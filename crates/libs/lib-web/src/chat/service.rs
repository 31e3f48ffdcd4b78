//! # Chat Service
//!
//! Coordinates one chat turn: store the user message, replay recent
//! history into the generator, store the reply.
//!
//! Two modes:
//!
//! - [`ChatService::process_message`] waits for the whole reply.
//! - [`ChatService::process_message_stream`] returns a [`ChatStream`] of
//!   [`StreamingEvent`]s: `UserMessageSaved`, then one `Chunk` per fragment,
//!   then `Complete`. A failure yields one error and ends the stream.
//!
//! Nothing is rolled back: when generation fails the user message stays
//! stored and no assistant message is written.

use futures_util::{Stream, StreamExt};
use lib_ai::{AiService, HistoryEntry};
use lib_core::model::{validate_user_content, MessageMetadata, MessageRole, MessageStore};
use lib_core::{AppError, Result};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

use super::locks::ConversationLocks;

/// Buffered events between the producer task and the consumer.
const STREAM_BUFFER: usize = 32;

/// Outcome of one completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMessageResult {
    pub user_message_id: String,
    pub assistant_message_id: String,
    pub content: String,
    /// Wall-clock duration from the start of the call, including any wait for the
    /// conversation's turn, to the assistant-message write
    pub processing_time_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamingEvent {
    UserMessageSaved { message_id: String },
    Chunk(String),
    Complete(ProcessMessageResult),
}

#[derive(Clone)]
pub struct ChatService {
    messages: Arc<dyn MessageStore>,
    ai: AiService,
    history_window: i64,
    locks: ConversationLocks,
}

impl ChatService {
    pub fn new(messages: Arc<dyn MessageStore>, ai: AiService, history_window: i64) -> Self {
        Self {
            messages,
            ai,
            history_window,
            locks: ConversationLocks::new(),
        }
    }

    pub fn ai(&self) -> &AiService {
        &self.ai
    }

    // region: --- Blocking

    /// Run one turn and wait for the full reply.
    pub async fn process_message(&self, conversation_id: &str, text: &str) -> Result<ProcessMessageResult> {
        validate_user_content(text)?;

        let start = Instant::now();
        let _turn = self.locks.acquire(conversation_id).await;

        let user_message = self
            .messages
            .append(conversation_id, MessageRole::User, text, None)
            .await?;

        let history = self.load_history(conversation_id).await?;
        let reply = self.ai.generate_response(&history).await?;

        let metadata = MessageMetadata {
            model: Some(self.ai.model_name().to_string()),
            tokens_used: reply.tokens_used,
            processing_time_ms: Some(reply.processing_time_ms),
        };
        let assistant_message = self
            .messages
            .append(conversation_id, MessageRole::Assistant, &reply.text, Some(metadata))
            .await?;

        let processing_time_ms = start.elapsed().as_millis() as i64;
        info!(
            conversation_id = %conversation_id,
            duration_ms = processing_time_ms,
            "[CHAT] Turn processed"
        );

        Ok(ProcessMessageResult {
            user_message_id: user_message.id,
            assistant_message_id: assistant_message.id,
            content: assistant_message.content,
            processing_time_ms,
        })
    }

    // endregion: --- Blocking

    // region: --- Streaming

    /// Run one turn, streaming the reply as it is generated.
    ///
    /// Work happens on a spawned task. Dropping the returned [`ChatStream`]
    /// (or calling [`ChatStream::cancel`]) stops generation; a cancelled
    /// turn never writes an assistant message and never yields `Complete`.
    pub fn process_message_stream(&self, conversation_id: &str, text: &str) -> ChatStream {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let cancel = CancellationToken::new();

        let service = self.clone();
        let conversation_id = conversation_id.to_string();
        let text = text.to_string();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            if let Err(e) = service.drive_stream(&conversation_id, &text, &tx, &task_cancel).await {
                error!(conversation_id = %conversation_id, error = %e, "[CHAT] Stream failed");
                let _ = tx.send(Err(e)).await;
            }
        });

        ChatStream {
            rx,
            cancel: cancel.clone(),
            _guard: cancel.drop_guard(),
        }
    }

    async fn drive_stream(
        &self,
        conversation_id: &str,
        text: &str,
        tx: &mpsc::Sender<Result<StreamingEvent>>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        validate_user_content(text)?;

        let start = Instant::now();
        let _turn = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            guard = self.locks.acquire(conversation_id) => guard,
        };

        let user_message = self
            .messages
            .append(conversation_id, MessageRole::User, text, None)
            .await?;

        if !emit(tx, StreamingEvent::UserMessageSaved { message_id: user_message.id.clone() }).await {
            return Ok(());
        }

        let history = self.load_history(conversation_id).await?;

        let mut fragments = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            fragments = self.ai.generate_response_stream(&history) => fragments?,
        };

        let mut buffer = String::new();
        let mut chunk_count = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(
                        conversation_id = %conversation_id,
                        chunks = chunk_count,
                        "[CHAT] Stream cancelled by consumer"
                    );
                    return Ok(());
                }
                next = fragments.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    buffer.push_str(&fragment);
                    chunk_count += 1;
                    if !emit(tx, StreamingEvent::Chunk(fragment)).await {
                        return Ok(());
                    }
                }
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }
        drop(fragments);

        if buffer.trim().is_empty() {
            return Err(AppError::Generation(
                "Failed to stream AI response: Empty response from AI".to_string(),
            ));
        }

        if cancel.is_cancelled() {
            return Ok(());
        }

        let metadata = MessageMetadata {
            model: Some(self.ai.model_name().to_string()),
            tokens_used: None,
            processing_time_ms: Some(start.elapsed().as_millis() as i64),
        };
        let assistant_message = self
            .messages
            .append(conversation_id, MessageRole::Assistant, &buffer, Some(metadata))
            .await?;

        let processing_time_ms = start.elapsed().as_millis() as i64;
        info!(
            conversation_id = %conversation_id,
            chunks = chunk_count,
            duration_ms = processing_time_ms,
            "[CHAT] Streamed turn complete"
        );

        emit(
            tx,
            StreamingEvent::Complete(ProcessMessageResult {
                user_message_id: user_message.id,
                assistant_message_id: assistant_message.id,
                content: assistant_message.content,
                processing_time_ms,
            }),
        )
        .await;

        Ok(())
    }

    // endregion: --- Streaming

    // region: --- Existence Probes

    /// `true` if a one-message page of the conversation can be read.
    ///
    /// Both a missing conversation and a failed read report `false`; use
    /// [`probe_conversation`](Self::probe_conversation) to tell them apart.
    pub async fn conversation_exists(&self, conversation_id: &str) -> bool {
        self.messages.list_page(conversation_id, 1, 1).await.is_ok()
    }

    /// `Ok(false)` when the conversation is missing, `Err` when the read failed.
    pub async fn probe_conversation(&self, conversation_id: &str) -> Result<bool> {
        match self.messages.list_page(conversation_id, 1, 1).await {
            Ok(_) => Ok(true),
            Err(AppError::NotFound(_)) => Ok(false),
            Err(e) => {
                warn!(conversation_id = %conversation_id, error = %e, "[CHAT] Existence probe failed");
                Err(e)
            }
        }
    }

    // endregion: --- Existence Probes

    async fn load_history(&self, conversation_id: &str) -> Result<Vec<HistoryEntry>> {
        let messages = self
            .messages
            .recent_history(conversation_id, self.history_window)
            .await?;

        debug!(conversation_id = %conversation_id, turns = messages.len(), "[CHAT] History loaded");

        Ok(messages.iter().map(HistoryEntry::from).collect())
    }
}

/// `false` once the consumer is gone.
async fn emit(tx: &mpsc::Sender<Result<StreamingEvent>>, event: StreamingEvent) -> bool {
    tx.send(Ok(event)).await.is_ok()
}

// region: --- ChatStream

/// Consumer side of a streamed turn. Cancels the turn when dropped.
pub struct ChatStream {
    rx: mpsc::Receiver<Result<StreamingEvent>>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl ChatStream {
    /// Next event, or `None` once the turn has finished.
    pub async fn recv(&mut self) -> Option<Result<StreamingEvent>> {
        self.rx.recv().await
    }

    /// Stop the turn without waiting for the stream to be dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for ChatStream {
    type Item = Result<StreamingEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

// endregion: --- ChatStream
