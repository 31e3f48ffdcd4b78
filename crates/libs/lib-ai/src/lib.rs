//! # AI Library
//!
//! Text generation for chat replies: prompt construction, the provider
//! seam ([`TextGenerator`]), the Gemini implementation, and [`AiService`].

pub mod gemini;
pub mod generator;
pub mod prompt;
pub mod service;

pub use gemini::GeminiClient;
pub use generator::{Completion, FragmentStream, TextGenerator};
pub use prompt::{build_prompt, HistoryEntry, DEFAULT_SYSTEM_PROMPT};
pub use service::{AiHealth, AiService, GenerationResult};
