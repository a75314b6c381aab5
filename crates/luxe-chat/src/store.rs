//! Per-user conversation history.
//!
//! Each user identifier owns its own async mutex, so a read-append-save
//! cycle for one user excludes every other cycle for that user while
//! requests for different users proceed in parallel. The registry map is
//! only locked long enough to find or create a user's entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use luxe_core::config::ConversationConfig;
use luxe_core::types::{ConversationHistory, ConversationTurn};

use crate::error::ChatError;

#[derive(Debug, Default)]
struct Session {
    history: ConversationHistory,
    /// Unix seconds of the last save.
    last_active: i64,
}

/// Process-lifetime map from user identifier to conversation history.
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Session>>>>,
    /// Turns kept per user; 0 keeps everything.
    max_turns: usize,
    /// Idle seconds before a history is discarded; 0 never discards.
    idle_timeout_secs: i64,
}

impl ConversationStore {
    /// An unbounded store with no expiry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &ConversationConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns: config.max_turns,
            idle_timeout_secs: i64::from(config.idle_timeout_minutes) * 60,
        }
    }

    /// Acquire exclusive access to one user's history.
    ///
    /// The returned guard must be held across the whole read-modify-save
    /// sequence; other callers for the same user wait until it is dropped.
    pub async fn lock(&self, user_id: &str) -> Result<SessionGuard, ChatError> {
        let entry = Arc::clone(
            self.registry()?
                .entry(user_id.to_string())
                .or_default(),
        );

        let mut guard = entry.lock_owned().await;
        if self.is_expired(&guard) {
            debug!(user_id, "Conversation expired after inactivity");
            guard.history.clear();
        }

        Ok(SessionGuard {
            guard,
            max_turns: self.max_turns,
        })
    }

    /// Snapshot of a user's history (empty if the user is unknown).
    ///
    /// Read-only: an unknown user is not registered, and an expired history
    /// reads as empty without being cleared.
    pub async fn get(&self, user_id: &str) -> Result<ConversationHistory, ChatError> {
        let entry = match self.registry()?.get(user_id) {
            Some(entry) => Arc::clone(entry),
            None => return Ok(Vec::new()),
        };
        let session = entry.lock().await;
        if self.is_expired(&session) {
            return Ok(Vec::new());
        }
        Ok(session.history.clone())
    }

    /// Replace a user's history.
    pub async fn save(
        &self,
        user_id: &str,
        history: ConversationHistory,
    ) -> Result<(), ChatError> {
        self.lock(user_id).await?.save(history);
        Ok(())
    }

    /// Number of user identifiers seen so far.
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn registry(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<Session>>>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Storage(format!("session lock poisoned: {}", e)))
    }

    fn is_expired(&self, session: &Session) -> bool {
        self.idle_timeout_secs > 0
            && !session.history.is_empty()
            && Utc::now().timestamp() - session.last_active > self.idle_timeout_secs
    }
}

/// Exclusive handle on one user's history.
pub struct SessionGuard {
    guard: OwnedMutexGuard<Session>,
    max_turns: usize,
}

impl SessionGuard {
    pub fn history(&self) -> &[ConversationTurn] {
        &self.guard.history
    }

    /// Overwrite the history, applying the configured turn window.
    pub fn save(&mut self, mut history: ConversationHistory) {
        if self.max_turns > 0 && history.len() > self.max_turns {
            let excess = history.len() - self.max_turns;
            history.drain(..excess);
        }
        self.guard.history = history;
        self.guard.last_active = Utc::now().timestamp();
    }
}
