use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::context::{SessionContext, SessionView};
use crate::core::config::PanelSettings;
use crate::core::errors::ApiError;

pub type SessionHandle = Arc<Mutex<SessionContext>>;

/// Listing entry. A session whose lock is held by an in-flight action is
/// reported as busy instead of waited on.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionSummary {
    Idle(SessionView),
    Busy { id: String },
}

/// In-memory sessions, one per browser tab. Nothing is persisted; a
/// restart forgets every session.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, settings: &PanelSettings) -> (String, SessionHandle) {
        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(SessionContext::new(id.clone(), settings)));
        self.sessions
            .write()
            .await
            .insert(id.clone(), handle.clone());
        tracing::info!("Created session {}", id);
        (id, handle)
    }

    pub async fn get(&self, id: &str) -> Result<SessionHandle, ApiError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Session not found: {}", id)))
    }

    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!("Deleted session {}", id);
        }
        removed
    }

    pub async fn summaries(&self) -> Vec<SessionSummary> {
        let mut handles: Vec<(String, SessionHandle)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect();
        handles.sort_by(|a, b| a.0.cmp(&b.0));

        handles
            .into_iter()
            .map(|(id, handle)| match handle.try_lock() {
                Ok(ctx) => SessionSummary::Idle(ctx.snapshot()),
                Err(_) => SessionSummary::Busy { id },
            })
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_get_remove() {
        let store = SessionStore::new();
        let (id, handle) = store.create(&PanelSettings::default()).await;
        handle.lock().await.debug_mode = true;

        let fetched = store.get(&id).await.unwrap();
        assert!(fetched.lock().await.debug_mode);
        assert_eq!(store.count().await, 1);

        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(matches!(store.get(&id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_does_not_wait_on_locked_sessions() {
        let store = SessionStore::new();
        let (busy_id, busy) = store.create(&PanelSettings::default()).await;
        let (idle_id, _) = store.create(&PanelSettings::default()).await;
        let _guard = busy.lock().await;

        let summaries = store.summaries().await;

        assert_eq!(summaries.len(), 2);
        for summary in summaries {
            match summary {
                SessionSummary::Busy { id } => assert_eq!(id, busy_id),
                SessionSummary::Idle(view) => assert_eq!(view.id, idle_id),
            }
        }
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new();
        let (_, a) = store.create(&PanelSettings::default()).await;
        let (_, b) = store.create(&PanelSettings::default()).await;
        a.lock().await.push_user_turn("only in a");
        assert_eq!(a.lock().await.transcript().len(), 1);
        assert!(b.lock().await.transcript().is_empty());
        assert_eq!(store.summaries().await.len(), 2);
    }
}
