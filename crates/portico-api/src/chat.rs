//! In-memory chat session store for the assistant stub.
//!
//! Sessions are ephemeral, process-local state: lost on restart, scoped
//! to the tenant that created them. The real assistant backend is not
//! wired yet; the HTTP layer streams canned events against these
//! sessions.

use chrono::{DateTime, Utc};
use portico_core::TenantId;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// One visitor chat session bound to a tenant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// Mutex-guarded map of live chat sessions.
#[derive(Debug, Default)]
pub struct MemoryChatSessionStore {
    sessions: Mutex<HashMap<Uuid, ChatSession>>,
}

impl MemoryChatSessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session for `tenant_id` and return a copy of it.
    pub fn create(&self, tenant_id: TenantId) -> ChatSession {
        let now = Utc::now();
        let session = ChatSession {
            id: Uuid::new_v4(),
            tenant_id,
            created_at: now,
            last_active_at: now,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        session
    }

    /// Fetch a session by ID.
    pub fn get(&self, session_id: Uuid) -> Option<ChatSession> {
        self.sessions.lock().unwrap().get(&session_id).cloned()
    }

    /// Bump a session's last-activity timestamp. Returns `false` when the
    /// session does not exist.
    pub fn touch(&self, session_id: Uuid) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(&session_id) {
            Some(session) => {
                session.last_active_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Whether no sessions exist.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
