//! Transcript storage for a single conversation.
//!
//! The store is an ordered, append-only log of turns plus the session
//! metadata needed to report statistics and produce snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use banker_core::{ChatMessage, Role};

/// One recorded message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Role/content view of this turn, without bookkeeping metadata.
    #[must_use]
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.content.clone())
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("system turns are injected at call time and never stored")]
    SystemRole,
}

/// Statistics derived from the transcript on demand.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub elapsed_seconds: f64,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}

/// Point-in-time copy of a transcript, suitable for persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub turn_count: usize,
    pub turns: Vec<Turn>,
}

/// Ordered log of the turns of one conversation.
///
/// Turns can only be added through [`TranscriptStore::append`] and removed
/// all at once through [`TranscriptStore::reset`]. Readers get a shared
/// slice, so recorded turns cannot be edited.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    session_id: Uuid,
    turns: Vec<Turn>,
    started_at: DateTime<Utc>,
    turn_count: usize,
}

impl TranscriptStore {
    /// Create an empty transcript starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_id: Uuid::now_v7(),
            turns: Vec::new(),
            started_at: Utc::now(),
            turn_count: 0,
        }
    }

    /// Record a turn stamped with the current time.
    ///
    /// Empty content is accepted; whether to record an empty turn is the
    /// caller's policy. `Role::System` is rejected and the store is left
    /// untouched.
    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<String>,
    ) -> Result<&Turn, TranscriptError> {
        if role == Role::System {
            return Err(TranscriptError::SystemRole);
        }
        Ok(self.push(role, content.into()))
    }

    pub(crate) fn push(&mut self, role: Role, content: String) -> &Turn {
        debug_assert_ne!(role, Role::System);
        self.turns.push(Turn {
            role,
            content,
            timestamp: Utc::now(),
        });
        self.turn_count += 1;
        &self.turns[self.turns.len() - 1]
    }

    /// All recorded turns in insertion order.
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    /// The transcript as role/content pairs, timestamps stripped.
    #[must_use]
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(Turn::to_message).collect()
    }

    /// Drop every turn and restart the session clock.
    ///
    /// Snapshots taken earlier are independent copies and are unaffected.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turn_count = 0;
        self.started_at = Utc::now();
        self.session_id = Uuid::now_v7();
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        let user_messages = self.turns.iter().filter(|t| t.role == Role::User).count();
        let assistant_messages = self
            .turns
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count();
        let total_characters: usize = self.turns.iter().map(|t| t.content.chars().count()).sum();

        SessionStats {
            total_messages: self.turns.len(),
            user_messages,
            assistant_messages,
            elapsed_seconds: elapsed_seconds(self.started_at, Utc::now()),
            total_characters,
            estimated_tokens: total_characters / 4, // rough: 4 chars per token
        }
    }

    #[must_use]
    pub fn to_snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            session_id: self.session_id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            turn_count: self.turn_count,
            turns: self.turns.clone(),
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub const fn turn_count(&self) -> usize {
        self.turn_count
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "session durations fit easily in f64 milliseconds"
)]
fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = to.signed_duration_since(from).num_milliseconds().max(0);
    millis as f64 / 1000.0
}
