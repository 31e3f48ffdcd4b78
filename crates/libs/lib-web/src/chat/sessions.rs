//! # Socket Sessions
//!
//! Connection id → attached conversation. An entry lives from connect to
//! disconnect; `leave` returns it to [`SessionState::Unattached`].

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unattached,
    Attached(String),
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection and return its id.
    pub async fn register(&self) -> String {
        let connection_id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(connection_id.clone(), SessionState::Unattached);
        connection_id
    }

    /// Attach to a conversation, replacing any previous attachment.
    /// Returns `false` if the connection is no longer registered.
    pub async fn attach(&self, connection_id: &str, conversation_id: &str) -> bool {
        match self.sessions.write().await.get_mut(connection_id) {
            Some(state) => {
                *state = SessionState::Attached(conversation_id.to_string());
                true
            }
            None => false,
        }
    }

    /// Drop the attachment, returning the conversation that was attached.
    pub async fn detach(&self, connection_id: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.get_mut(connection_id)?;
        match std::mem::replace(state, SessionState::Unattached) {
            SessionState::Attached(conversation_id) => Some(conversation_id),
            SessionState::Unattached => None,
        }
    }

    pub async fn state(&self, connection_id: &str) -> Option<SessionState> {
        self.sessions.read().await.get(connection_id).cloned()
    }

    /// `true` if the connection is attached to exactly this conversation.
    pub async fn is_attached_to(&self, connection_id: &str, conversation_id: &str) -> bool {
        matches!(
            self.sessions.read().await.get(connection_id),
            Some(SessionState::Attached(current)) if current == conversation_id
        )
    }

    pub async fn remove(&self, connection_id: &str) -> Option<SessionState> {
        self.sessions.write().await.remove(connection_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lifecycle() {
        let sessions = SessionRegistry::new();
        let id = sessions.register().await;
        assert_eq!(sessions.state(&id).await, Some(SessionState::Unattached));

        assert!(sessions.attach(&id, "c1").await);
        assert!(sessions.is_attached_to(&id, "c1").await);
        assert!(!sessions.is_attached_to(&id, "c2").await);

        assert!(sessions.attach(&id, "c2").await);
        assert_eq!(sessions.detach(&id).await, Some("c2".to_string()));
        assert_eq!(sessions.detach(&id).await, None);

        sessions.remove(&id).await;
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_attach_after_remove_does_not_resurrect() {
        let sessions = SessionRegistry::new();
        let id = sessions.register().await;
        sessions.remove(&id).await;

        assert!(!sessions.attach(&id, "c1").await);
        assert_eq!(sessions.state(&id).await, None);
        assert_eq!(sessions.len().await, 0);
    }
}
