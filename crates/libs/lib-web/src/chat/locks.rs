//! # Per-Conversation Turn Locks
//!
//! One chat turn per conversation at a time, held from the user-message
//! write to the assistant-message write, so every turn replays a history
//! that includes the previous turn's reply. Turns in different
//! conversations do not contend.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<HashMap<String, Weak<Mutex<()>>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the conversation's turn. Released when the guard drops.
    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries whose guards are all gone are dead weight.
            locks.retain(|_, weak| weak.strong_count() > 0);

            match locks.get(conversation_id).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    locks.insert(conversation_id.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };

        lock.lock_owned().await
    }

    /// Conversations with a live lock.
    #[cfg(test)]
    pub async fn active(&self) -> usize {
        self.locks
            .lock()
            .await
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
