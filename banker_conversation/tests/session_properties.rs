//! Behavioral properties of a conversation session, exercised through the
//! public API with stub providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use banker_conversation::{SessionController, SessionError};
use banker_core::{
    ChatMessage, Completion, CompletionProvider, ProviderError, ProviderErrorKind, Role,
};

/// Replies with `ECHO:` followed by the latest user message.
struct Echo;

#[async_trait]
impl CompletionProvider for Echo {
    async fn complete(
        &self,
        _system_prompt: &str,
        turns: &[ChatMessage],
    ) -> anyhow::Result<Completion> {
        let last_user = turns
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map_or("", |m| m.content.as_str());
        Ok(Completion::text(format!("ECHO:{last_user}")))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Fails every call and counts how often it was asked.
#[derive(Default)]
struct AlwaysFails {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for AlwaysFails {
    async fn complete(
        &self,
        _system_prompt: &str,
        _turns: &[ChatMessage],
    ) -> anyhow::Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::new(ProviderErrorKind::Authentication, "401 Unauthorized").into())
    }

    fn name(&self) -> &'static str {
        "always-fails"
    }
}

fn echo_session() -> SessionController<Echo> {
    SessionController::new(Echo, "You are a banking assistant.")
}

#[tokio::test]
async fn successful_submits_append_two_turns_each_in_order() {
    let mut session = echo_session();
    let questions = ["balance?", "rates?", "fees?", "hours?"];

    for (n, q) in questions.iter().enumerate() {
        session.submit(q).await.unwrap();
        assert_eq!(session.history().len(), 2 * (n + 1));
    }

    for (pair, q) in session.history().chunks(2).zip(questions) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[0].content, q);
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(pair[1].content, format!("ECHO:{q}"));
    }
}

#[tokio::test]
async fn failed_call_keeps_user_turn_only() {
    let provider = Arc::new(AlwaysFails::default());
    let mut session = SessionController::new(provider.clone(), "sys");

    let err = session.submit("balance?").await.unwrap_err();

    match err {
        SessionError::Provider(e) => {
            assert_eq!(e.cause, ProviderErrorKind::Authentication);
            assert_eq!(e.message, "401 Unauthorized");
        }
        SessionError::EmptyMessage => panic!("expected a provider error"),
    }
    let history = session.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "balance?");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retry_after_failure_appends_a_fresh_user_turn() {
    let mut session = SessionController::new(AlwaysFails::default(), "sys");

    assert!(session.submit("balance?").await.is_err());
    assert!(session.submit("balance?").await.is_err());

    let stats = session.current_stats();
    assert_eq!(stats.total_messages, 2);
    assert_eq!(stats.user_messages, 2);
    assert_eq!(stats.assistant_messages, 0);
    assert_eq!(session.provider().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn clear_then_stats_is_zeroed() {
    let mut session = echo_session();
    for q in ["a", "b", "c"] {
        session.submit(q).await.unwrap();
    }
    let started_before = session.transcript().started_at();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.current_stats().elapsed_seconds >= 0.05);

    session.clear();
    let stats = session.current_stats();

    assert_eq!(stats.total_messages, 0);
    assert_eq!(stats.user_messages, 0);
    assert_eq!(stats.assistant_messages, 0);
    assert!(stats.elapsed_seconds < 0.05);
    assert!(session.transcript().started_at() > started_before);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn blank_input_is_rejected_without_side_effects() {
    let provider = Arc::new(AlwaysFails::default());
    let mut session = SessionController::new(provider.clone(), "sys");

    for input in ["", "   ", "\t\n"] {
        let err = session.submit(input).await.unwrap_err();
        assert!(err.is_validation());
    }

    assert!(session.history().is_empty());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn snapshot_is_stable_without_mutation() {
    let mut session = echo_session();
    session.submit("rates?").await.unwrap();

    let first = session.snapshot();
    let second = session.snapshot();

    assert_eq!(first.turn_count, second.turn_count);
    assert_eq!(first.turns, second.turns);
    assert_eq!(first.started_at, second.started_at);
    assert!(second.ended_at >= first.ended_at);
}

#[tokio::test]
async fn snapshot_taken_before_clear_is_untouched() {
    let mut session = echo_session();
    session.submit("rates?").await.unwrap();
    let saved = session.snapshot();

    session.clear();

    assert_eq!(saved.turn_count, 2);
    assert_eq!(saved.turns.len(), 2);
    assert_eq!(session.snapshot().turn_count, 0);
}

#[tokio::test]
async fn echo_round_trip() {
    let mut session = echo_session();

    let reply = session.submit("rates?").await.unwrap();

    assert_eq!(reply, "ECHO:rates?");
    let turns: Vec<(Role, &str)> = session
        .history()
        .iter()
        .map(|t| (t.role, t.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        [(Role::User, "rates?"), (Role::Assistant, "ECHO:rates?")]
    );
    assert_eq!(session.current_stats().total_messages, 2);
}

#[tokio::test]
async fn snapshot_json_shape() {
    let mut session = echo_session();
    session.submit("rates?").await.unwrap();

    let json = serde_json::to_value(session.snapshot()).unwrap();

    for key in ["session_id", "started_at", "ended_at", "turn_count", "turns"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["turns"][1]["role"], "assistant");
    assert_eq!(json["turns"][1]["content"], "ECHO:rates?");
}
