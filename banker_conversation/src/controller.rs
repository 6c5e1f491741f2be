//! Session controller driving one request/response cycle at a time.
//!
//! The controller owns the transcript of exactly one conversation and talks
//! to a [`CompletionProvider`] injected by the caller. Front ends (console,
//! web, tests) only ever see [`SessionController::submit`] and the session
//! commands.

use std::sync::Arc;

use banker_core::{CompletionProvider, ProviderError, ProviderErrorKind, Role};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::transcript::{SessionStats, TranscriptSnapshot, TranscriptStore, Turn};

/// Errors returned by [`SessionController::submit`].
///
/// Both variants leave the session usable.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The message was empty or whitespace-only; nothing was recorded.
    #[error("message is empty")]
    EmptyMessage,

    /// The provider failed; the user turn stays in the transcript.
    #[error("completion failed: {0}")]
    Provider(#[from] ProviderError),
}

impl SessionError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }

    #[must_use]
    pub const fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            Self::EmptyMessage => None,
        }
    }
}

/// Owns one conversation and sequences its turns.
///
/// `submit` borrows the controller mutably for the whole provider call, so a
/// second submission on the same session cannot start until the first one
/// resolves. Callers sharing a controller between tasks must put it behind
/// their own mutex.
pub struct SessionController<P = Arc<dyn CompletionProvider>>
where
    P: Send + Sync,
{
    provider: P,
    system_prompt: String,
    transcript: TranscriptStore,
}

impl<P> SessionController<P>
where
    P: CompletionProvider + Send + Sync,
{
    pub fn new(provider: P, system_prompt: impl Into<String>) -> Self {
        let transcript = TranscriptStore::new();
        info!(
            "Creating session controller for session: {}",
            transcript.session_id()
        );

        Self {
            provider,
            system_prompt: system_prompt.into(),
            transcript,
        }
    }

    /// Send one user message and record the reply.
    ///
    /// Blank input is rejected before anything is recorded. On provider
    /// failure the user turn is kept and no assistant turn is added; the
    /// call is not retried.
    pub async fn submit(&mut self, user_text: &str) -> Result<String, SessionError> {
        if user_text.trim().is_empty() {
            debug!("Rejected empty message");
            return Err(SessionError::EmptyMessage);
        }

        let turn_number = self.next_turn_number();
        self.transcript.push(Role::User, user_text.to_string());

        let messages = self.transcript.to_messages();
        info!(
            "Processing turn {turn_number} for session {}: {} messages, provider={}",
            self.transcript.session_id(),
            messages.len(),
            self.provider.name()
        );

        let completion = match self.provider.complete(&self.system_prompt, &messages).await {
            Ok(completion) => completion,
            Err(e) => {
                let error = ProviderError::from_anyhow(&e);
                warn!("Turn {turn_number} failed: {error}");
                return Err(error.into());
            }
        };

        // A blank reply would be a phantom assistant turn.
        if completion.content.trim().is_empty() {
            warn!("Turn {turn_number} failed: provider returned an empty reply");
            return Err(ProviderError::new(
                ProviderErrorKind::EmptyReply,
                "provider returned no content",
            )
            .into());
        }

        if let Some(usage) = completion.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let reply = self
            .transcript
            .push(Role::Assistant, completion.content)
            .content
            .clone();
        debug!("Turn {turn_number} completed, reply_len={}", reply.len());

        Ok(reply)
    }

    /// Number the next user turn will carry, counting failed attempts.
    fn next_turn_number(&self) -> usize {
        self.transcript
            .history()
            .iter()
            .filter(|t| t.role == Role::User)
            .count()
            + 1
    }

    /// Start the conversation over. Safe to call at any time.
    pub fn clear(&mut self) {
        info!(
            "Clearing session {} ({} turns)",
            self.transcript.session_id(),
            self.transcript.len()
        );
        self.transcript.reset();
    }

    #[must_use]
    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.transcript.to_snapshot()
    }

    #[must_use]
    pub fn current_stats(&self) -> SessionStats {
        self.transcript.stats()
    }

    #[must_use]
    pub fn history(&self) -> &[Turn] {
        self.transcript.history()
    }

    #[must_use]
    pub const fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}
