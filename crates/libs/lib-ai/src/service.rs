//! # AI Service
//!
//! Prompt assembly, timing and error context on top of a [`TextGenerator`].
//!
//! ```rust,no_run
//! use lib_ai::{AiService, GeminiClient, HistoryEntry};
//! use lib_core::model::MessageRole;
//! use std::sync::Arc;
//!
//! # async fn example() -> lib_core::Result<()> {
//! let generator = Arc::new(GeminiClient::new("key", "gemini-2.0-flash")?);
//! let ai = AiService::new(generator, None);
//!
//! let history = vec![HistoryEntry::new(MessageRole::User, "Oi!")];
//! let reply = ai.generate_response(&history).await?;
//! println!("{} ({}ms)", reply.text, reply.processing_time_ms);
//! # Ok(())
//! # }
//! ```

use futures_util::StreamExt;
use lib_core::{AppError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::generator::{FragmentStream, TextGenerator};
use crate::prompt::{build_prompt, HistoryEntry, DEFAULT_SYSTEM_PROMPT};

/// A generated reply with timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
    pub tokens_used: Option<i64>,
    pub processing_time_ms: i64,
}

/// Result of [`AiService::health_check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiHealth {
    /// `ok` or `error`
    pub status: &'static str,
    pub model: String,
    pub configured: bool,
}

#[derive(Clone)]
pub struct AiService {
    generator: Arc<dyn TextGenerator>,
    system_prompt: String,
}

impl AiService {
    /// `system_prompt` falls back to [`DEFAULT_SYSTEM_PROMPT`].
    pub fn new(generator: Arc<dyn TextGenerator>, system_prompt: Option<String>) -> Self {
        Self {
            generator,
            system_prompt: system_prompt.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Generate a complete reply for the given history.
    ///
    /// # Errors
    ///
    /// [`AppError::Generation`] prefixed with `Failed to generate AI response:`.
    pub async fn generate_response(&self, history: &[HistoryEntry]) -> Result<GenerationResult> {
        let start = Instant::now();
        let prompt = build_prompt(&self.system_prompt, history);

        info!(history_len = history.len(), "[AI] Generating response");

        let completion = self.generator.complete(&prompt).await.map_err(|e| {
            error!(error = %e, "[AI] Generation failed");
            AppError::Generation(format!("Failed to generate AI response: {}", detail(&e)))
        })?;

        let processing_time_ms = start.elapsed().as_millis() as i64;
        info!(
            duration_ms = processing_time_ms,
            chars = completion.text.chars().count(),
            "[AI] Response generated"
        );

        Ok(GenerationResult {
            text: completion.text,
            tokens_used: completion.tokens_used,
            processing_time_ms,
        })
    }

    /// Start a streamed reply for the given history.
    ///
    /// A failure to start is [`AppError::Generation`]; a failure after
    /// fragments began flowing is yielded as [`AppError::StreamInterrupted`].
    /// Both carry the `Failed to stream AI response:` prefix.
    pub async fn generate_response_stream(&self, history: &[HistoryEntry]) -> Result<FragmentStream> {
        let prompt = build_prompt(&self.system_prompt, history);

        info!(history_len = history.len(), "[AI] Starting streamed response");

        let fragments = self.generator.complete_stream(&prompt).await.map_err(|e| {
            error!(error = %e, "[AI] Stream failed to start");
            AppError::Generation(format!("Failed to stream AI response: {}", detail(&e)))
        })?;

        let fragments = fragments.map(|item| {
            item.map_err(|e| {
                error!(error = %e, "[AI] Stream interrupted");
                AppError::StreamInterrupted(format!("Failed to stream AI response: {}", detail(&e)))
            })
        });

        Ok(Box::pin(fragments))
    }

    /// Probe the provider with a minimal prompt.
    pub async fn health_check(&self) -> AiHealth {
        let model = self.model_name().to_string();
        match self.generator.complete("Hello").await {
            Ok(_) => AiHealth { status: "ok", model, configured: true },
            Err(e) => {
                error!(error = %e, "[AI] Health check failed");
                AiHealth { status: "error", model, configured: false }
            }
        }
    }
}

/// Inner message without the variant prefix added by `Display`.
fn detail(err: &AppError) -> String {
    match err {
        AppError::Generation(msg) | AppError::StreamInterrupted(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Completion;
    use async_trait::async_trait;
    use futures_util::stream;
    use lib_core::model::MessageRole;
    use std::sync::Mutex;

    /// Records prompts and replays scripted output.
    struct ScriptedGenerator {
        reply: Result<String>,
        fragments: Vec<Result<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn ok(reply: &str) -> Self {
            Self { reply: Ok(reply.to_string()), fragments: Vec::new(), prompts: Mutex::new(Vec::new()) }
        }

        fn failing(msg: &str) -> Self {
            Self {
                reply: Err(AppError::Generation(msg.to_string())),
                fragments: Vec::new(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &str) -> Result<Completion> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(Completion { text: text.clone(), tokens_used: Some(7) }),
                Err(e) => Err(AppError::Generation(detail(e))),
            }
        }

        async fn complete_stream(&self, prompt: &str) -> Result<FragmentStream> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let items: Vec<Result<String>> = self
                .fragments
                .iter()
                .map(|f| match f {
                    Ok(s) => Ok(s.clone()),
                    Err(e) => Err(AppError::Generation(detail(e))),
                })
                .collect();
            Ok(Box::pin(stream::iter(items)))
        }
    }

    #[tokio::test]
    async fn test_generate_response_builds_prompt_from_history() {
        // Arrange
        let generator = Arc::new(ScriptedGenerator::ok("Olá!"));
        let ai = AiService::new(generator.clone(), Some("PERSONA".to_string()));
        let history = vec![HistoryEntry::new(MessageRole::User, "Oi")];

        // Act
        let result = ai.generate_response(&history).await.unwrap();

        // Assert
        assert_eq!(result.text, "Olá!");
        assert_eq!(result.tokens_used, Some(7));
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("PERSONA"));
        assert!(prompts[0].contains("Usuário: Oi"));
    }

    #[tokio::test]
    async fn test_generate_response_wraps_errors() {
        let ai = AiService::new(Arc::new(ScriptedGenerator::failing("quota exceeded")), None);

        let err = ai.generate_response(&[]).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to generate AI response: quota exceeded");
    }

    #[tokio::test]
    async fn test_stream_errors_become_interruptions() {
        // Arrange
        let mut generator = ScriptedGenerator::ok("");
        generator.fragments = vec![Ok("a".to_string()), Err(AppError::Generation("reset".to_string()))];
        let ai = AiService::new(Arc::new(generator), None);

        // Act
        let items: Vec<Result<String>> = ai.generate_response_stream(&[]).await.unwrap().collect().await;

        // Assert
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        assert!(matches!(
            &items[1],
            Err(AppError::StreamInterrupted(msg)) if msg == "Failed to stream AI response: reset"
        ));
    }

    #[tokio::test]
    async fn test_health_check_reports_status() {
        let healthy = AiService::new(Arc::new(ScriptedGenerator::ok("hi")), None);
        let broken = AiService::new(Arc::new(ScriptedGenerator::failing("401")), None);

        assert_eq!(
            healthy.health_check().await,
            AiHealth { status: "ok", model: "scripted".to_string(), configured: true }
        );
        assert_eq!(broken.health_check().await.status, "error");
        assert!(!broken.health_check().await.configured);
    }
}
