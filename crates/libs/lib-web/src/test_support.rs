//! Shared fixtures for lib-web tests: a migrated in-memory database and a
//! scripted [`TextGenerator`].

use async_trait::async_trait;
use futures_util::stream;
use lib_ai::{Completion, FragmentStream, TextGenerator};
use lib_core::{AppError, Config, DbPool, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::server::{build_state, AppState};

pub const TEST_MODEL: &str = "scripted-model";

pub async fn setup_test_db() -> DbPool {
    let pool = lib_core::create_pool("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    lib_core::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

// region: --- ScriptedGenerator

/// Replies with fixed fragments and records every prompt it receives.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    fragments: Vec<String>,
    fail_after: Option<usize>,
    fail_to_start: bool,
    hang_after: Option<usize>,
    delay: Option<Duration>,
    prompts: Arc<Mutex<Vec<String>>>,
    dropped: Arc<AtomicBool>,
}

impl ScriptedGenerator {
    pub fn replying(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Yield `k` fragments, then an error.
    pub fn failing_after(mut self, k: usize) -> Self {
        self.fail_after = Some(k);
        self
    }

    pub fn failing_to_start(mut self) -> Self {
        self.fail_to_start = true;
        self
    }

    /// Yield `k` fragments, then never produce another item.
    pub fn hanging_after(mut self, k: usize) -> Self {
        self.hang_after = Some(k);
        self
    }

    /// Sleep before every fragment.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }

    /// `true` once a fragment stream handed out by this generator was dropped.
    pub fn stream_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    fn record(&self, prompt: &str) {
        self.prompts.lock().expect("prompt log poisoned").push(prompt.to_string());
    }
}

struct DropSignal(Arc<AtomicBool>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

struct Script {
    items: VecDeque<Result<String>>,
    hang: bool,
    delay: Option<Duration>,
    _signal: DropSignal,
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model_name(&self) -> &str {
        TEST_MODEL
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.record(prompt);
        if self.fail_to_start || self.fail_after.is_some() {
            return Err(AppError::Generation("quota exceeded".to_string()));
        }
        Ok(Completion {
            text: self.fragments.concat(),
            tokens_used: Some(42),
        })
    }

    async fn complete_stream(&self, prompt: &str) -> Result<FragmentStream> {
        self.record(prompt);
        if self.fail_to_start {
            return Err(AppError::Generation("quota exceeded".to_string()));
        }

        let take = self
            .fail_after
            .or(self.hang_after)
            .unwrap_or(self.fragments.len());
        let mut items: VecDeque<Result<String>> =
            self.fragments.iter().take(take).cloned().map(Ok).collect();
        if self.fail_after.is_some() {
            items.push_back(Err(AppError::Generation("connection reset".to_string())));
        }

        let script = Script {
            items,
            hang: self.hang_after.is_some(),
            delay: self.delay,
            _signal: DropSignal(self.dropped.clone()),
        };

        let fragments = stream::unfold(script, |mut script| async move {
            if let Some(delay) = script.delay {
                tokio::time::sleep(delay).await;
            }
            match script.items.pop_front() {
                Some(item) => Some((item, script)),
                None if script.hang => {
                    futures_util::future::pending::<()>().await;
                    None
                }
                None => None,
            }
        });

        Ok(Box::pin(fragments))
    }
}

// endregion: --- ScriptedGenerator

/// Full application state over an in-memory database and a scripted generator.
pub async fn test_state(generator: ScriptedGenerator) -> AppState {
    let db = setup_test_db().await;
    build_state(db, Config::default(), Arc::new(generator))
}
