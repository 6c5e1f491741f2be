#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role/content pair as it goes over the wire to a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

impl Completion {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Maps a system prompt plus an ordered conversation to a generated reply.
///
/// `turns` never contains a `System` message; the prompt is passed
/// separately and providers decide how to place it on the wire.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatMessage],
    ) -> anyhow::Result<Completion>;

    fn name(&self) -> &str;
}

#[async_trait]
impl<T> CompletionProvider for Arc<T>
where
    T: CompletionProvider + ?Sized,
{
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatMessage],
    ) -> anyhow::Result<Completion> {
        (**self).complete(system_prompt, turns).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Coarse classification of a failed completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Network,
    Authentication,
    RateLimited,
    MalformedResponse,
    EmptyReply,
    Other,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network failure",
            Self::Authentication => "authentication failure",
            Self::RateLimited => "rate limited",
            Self::MalformedResponse => "malformed response",
            Self::EmptyReply => "empty reply",
            Self::Other => "provider failure",
        };
        f.write_str(label)
    }
}

/// The single normalized shape every provider failure takes once it
/// crosses the session boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{cause}: {message}")]
pub struct ProviderError {
    pub cause: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(cause: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
        }
    }

    /// Normalize an arbitrary provider error.
    ///
    /// A `ProviderError` anywhere in the chain keeps its classification;
    /// anything else becomes `Other` with the full chain as the message.
    #[must_use]
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        err.chain()
            .find_map(|e| e.downcast_ref::<Self>())
            .cloned()
            .unwrap_or_else(|| Self::new(ProviderErrorKind::Other, format!("{err:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl CompletionProvider for Fixed {
        async fn complete(
            &self,
            system_prompt: &str,
            turns: &[ChatMessage],
        ) -> anyhow::Result<Completion> {
            Ok(Completion::text(format!("{system_prompt}/{}", turns.len())))
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        let msg = ChatMessage::new(Role::Assistant, "hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn classified_error_survives_context() {
        let err = anyhow::Error::new(ProviderError::new(
            ProviderErrorKind::RateLimited,
            "429 Too Many Requests",
        ))
        .context("calling upstream");

        let normalized = ProviderError::from_anyhow(&err);
        assert_eq!(normalized.cause, ProviderErrorKind::RateLimited);
        assert_eq!(normalized.message, "429 Too Many Requests");
    }

    #[test]
    fn unclassified_error_becomes_other() {
        let err = anyhow::anyhow!("socket closed").context("sending request");
        let normalized = ProviderError::from_anyhow(&err);
        assert_eq!(normalized.cause, ProviderErrorKind::Other);
        assert_eq!(normalized.message, "sending request: socket closed");
    }

    #[tokio::test]
    async fn arc_provider_delegates() {
        let provider: Arc<dyn CompletionProvider> = Arc::new(Fixed);
        let turns = [ChatMessage::new(Role::User, "q")];
        let reply = provider.complete("sys", &turns).await.unwrap();
        assert_eq!(reply.content, "sys/1");
        assert_eq!(provider.name(), "fixed");
    }
}
