//! Session Registry
//!
//! Tracks live sessions so the server can enforce a session limit, report
//! them on the health endpoint and forward out-of-band control events.
//! The registry never touches session state; it only holds event senders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::events::SessionEvent;
use super::SessionError;

/// Unique identifier for a session
pub type SessionId = String;

/// Public description of a live session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub connected_at: DateTime<Utc>,
}

struct SessionEntry {
    events: Option<mpsc::Sender<SessionEvent>>,
    connected_at: DateTime<Utc>,
}

/// All live sessions of this process
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Reserve a slot for a new session.
    ///
    /// Fails once `max_sessions` sessions are live.
    pub async fn register(&self) -> Result<SessionId, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::TooManySessions);
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(
            id.clone(),
            SessionEntry {
                events: None,
                connected_at: Utc::now(),
            },
        );

        tracing::info!(session_id = %id, "Session registered");
        Ok(id)
    }

    /// Attach the actor's event sender once it is running
    pub async fn attach(
        &self,
        id: &str,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        entry.events = Some(events);
        Ok(())
    }

    /// Forget a session
    pub async fn unregister(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            tracing::info!(session_id = %id, "Session unregistered");
        }
    }

    /// Deliver an event to a live session
    pub async fn send(&self, id: &str, event: SessionEvent) -> Result<(), SessionError> {
        let sender = {
            let sessions = self.sessions.read().await;
            let entry = sessions
                .get(id)
                .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
            entry.events.clone().ok_or(SessionError::Closed)?
        };

        sender.send(event).await.map_err(|_| SessionError::Closed)
    }

    pub async fn get(&self, id: &str) -> Option<SessionInfo> {
        self.sessions.read().await.get(id).map(|entry| SessionInfo {
            id: id.to_string(),
            connected_at: entry.connected_at,
        })
    }

    /// All live sessions, oldest first
    pub async fn list(&self) -> Vec<SessionInfo> {
        let mut sessions: Vec<SessionInfo> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, entry)| SessionInfo {
                id: id.clone(),
                connected_at: entry.connected_at,
            })
            .collect();
        sessions.sort_by_key(|s| s.connected_at);
        sessions
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
