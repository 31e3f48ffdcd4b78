//! # Gemini Client
//!
//! [`TextGenerator`] backed by Google Gemini through `genai`.
//!
//! The API key is injected with an [`AuthResolver`] so the process
//! environment is never consulted at call time.

use async_trait::async_trait;
use futures_util::{future, StreamExt};
use genai::chat::{ChatMessage, ChatRequest, ChatStreamEvent};
use genai::resolver::{AuthData, AuthResolver};
use genai::Client;
use lib_core::config::PLACEHOLDER_API_KEY;
use lib_core::{AppError, Config, Result};
use tracing::debug;

use crate::generator::{Completion, FragmentStream, TextGenerator};

pub struct GeminiClient {
    client: Client,
    model: String,
}

impl GeminiClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// [`AppError::Config`] if the key is empty or still the placeholder.
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return Err(AppError::Config(
                "GEMINI_API_KEY not configured. Set a valid key in the environment".to_string(),
            ));
        }

        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden| -> std::result::Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(api_key.clone())))
            },
        );

        let client = Client::builder()
            .with_auth_resolver(auth_resolver)
            .build();

        tracing::info!(model = %model, "[AI] Gemini client initialized");

        Ok(Self {
            client,
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.gemini_api_key, &config.gemini_model)
    }

    fn request(prompt: &str) -> ChatRequest {
        ChatRequest::default().append_message(ChatMessage::user(prompt))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "[AI] exec_chat");

        let chat_res = self
            .client
            .exec_chat(&self.model, Self::request(prompt), None)
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;

        let text = chat_res
            .first_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Generation("Empty response from AI".to_string()))?
            .to_string();

        let tokens_used = chat_res.usage.total_tokens.map(i64::from);

        Ok(Completion { text, tokens_used })
    }

    async fn complete_stream(&self, prompt: &str) -> Result<FragmentStream> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "[AI] exec_chat_stream");

        let stream_res = self
            .client
            .exec_chat_stream(&self.model, Self::request(prompt), None)
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;

        let fragments = stream_res.stream.filter_map(|event| {
            future::ready(match event {
                Ok(ChatStreamEvent::Chunk(chunk)) if !chunk.content.is_empty() => Some(Ok(chunk.content)),
                Ok(_) => None,
                Err(e) => Some(Err(AppError::Generation(e.to_string()))),
            })
        });

        Ok(Box::pin(fragments))
    }
}
