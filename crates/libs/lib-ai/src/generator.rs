//! # Text Generator Seam
//!
//! Provider-facing trait implemented by [`GeminiClient`](crate::GeminiClient).
//! Test code implements it with scripted replies.

use async_trait::async_trait;
use futures_util::Stream;
use lib_core::Result;
use std::pin::Pin;

/// Lazy, finite, non-restartable sequence of text fragments.
///
/// Dropping the stream abandons the underlying request.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A complete reply from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Token usage, when the provider reports it
    pub tokens_used: Option<i64>,
}

/// Remote text generation. Errors are [`AppError::Generation`](lib_core::AppError::Generation)
/// carrying the provider's message; nothing here retries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier recorded in message metadata.
    fn model_name(&self) -> &str;

    /// Generate the whole reply in one call.
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Start a streamed reply.
    async fn complete_stream(&self, prompt: &str) -> Result<FragmentStream>;
}
