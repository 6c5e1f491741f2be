use std::time::Duration;

use async_trait::async_trait;
use banker_core::{
    ChatMessage, Completion, CompletionProvider, ProviderError, ProviderErrorKind, Role, Usage,
};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-large-latest";

/// Longest slice of an error body carried into a `ProviderError` message.
const MAX_ERROR_BODY: usize = 300;

pub struct MistralProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    timeout: Option<Duration>,
}

impl MistralProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating MistralProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Abort a request that has not completed within `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The system prompt goes first, followed by the conversation as-is.
    fn build_request(&self, system_prompt: &str, turns: &[ChatMessage]) -> Value {
        let messages: Vec<ChatMessage> =
            std::iter::once(ChatMessage::new(Role::System, system_prompt))
                .chain(turns.iter().cloned())
                .collect();

        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    async fn try_send(&self, request: &Value) -> Result<Completion, ProviderError> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                classify_status(status),
                format!("HTTP {status}: {}", clip(body.trim(), MAX_ERROR_BODY)),
            ));
        }

        let body = response.json::<Value>().await.map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::MalformedResponse,
                format!("response body is not JSON: {e}"),
            )
        })?;

        parse_completion(&body)
    }
}

#[async_trait]
impl CompletionProvider for MistralProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatMessage],
    ) -> anyhow::Result<Completion> {
        let request = self.build_request(system_prompt, turns);

        info!(
            "Sending request to Mistral API: model={}, messages={}",
            self.model,
            turns.len() + 1
        );

        match self.try_send(&request).await {
            Ok(completion) => {
                info!("Received response from Mistral API");
                Ok(completion)
            }
            Err(e) => {
                warn!("Mistral API request failed: {e}");
                Err(e.into())
            }
        }
    }

    fn name(&self) -> &'static str {
        "mistral"
    }
}

fn classify_status(status: StatusCode) -> ProviderErrorKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderErrorKind::Authentication,
        StatusCode::TOO_MANY_REQUESTS => ProviderErrorKind::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            ProviderErrorKind::Network
        }
        _ => ProviderErrorKind::Other,
    }
}

fn transport_error(err: &reqwest::Error) -> ProviderError {
    let kind = if let Some(status) = err.status() {
        classify_status(status)
    } else if err.is_timeout() || err.is_connect() || err.is_request() {
        ProviderErrorKind::Network
    } else if err.is_decode() {
        ProviderErrorKind::MalformedResponse
    } else {
        ProviderErrorKind::Other
    };
    debug!("Transport error classified as {kind:?}: {err}");
    ProviderError::new(kind, err.to_string())
}

fn parse_completion(body: &Value) -> Result<Completion, ProviderError> {
    let content = body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::MalformedResponse,
                "Invalid response format: missing content",
            )
        })?
        .to_string();

    let usage = body["usage"].as_object().map(|u| Usage {
        prompt_tokens: token_field(u.get("prompt_tokens")),
        completion_tokens: token_field(u.get("completion_tokens")),
        total_tokens: token_field(u.get("total_tokens")),
    });

    Ok(Completion { content, usage })
}

fn token_field(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

fn clip(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_puts_system_prompt_first() {
        let provider = MistralProvider::new("key".to_string())
            .with_model("mistral-small-latest".to_string())
            .with_max_tokens(1500);
        let turns = [
            ChatMessage::new(Role::User, "balance?"),
            ChatMessage::new(Role::Assistant, "Please log in."),
        ];

        let request = provider.build_request("You are a banking assistant.", &turns);

        assert_eq!(request["model"], "mistral-small-latest");
        assert_eq!(request["max_tokens"], 1500);
        let messages = request["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are a banking assistant.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["content"], "Please log in.");
        assert!(messages.iter().all(|m| m.get("timestamp").is_none()));
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            ProviderErrorKind::Authentication
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            ProviderErrorKind::Authentication
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            ProviderErrorKind::RateLimited
        );
        assert_eq!(
            classify_status(StatusCode::GATEWAY_TIMEOUT),
            ProviderErrorKind::Network
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            ProviderErrorKind::Other
        );
    }

    #[test]
    fn parses_content_and_usage() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Savings pay 4% APY." } }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128 }
        });

        let completion = parse_completion(&body).unwrap();
        assert_eq!(completion.content, "Savings pay 4% APY.");
        let usage = completion.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 120);
        assert_eq!(usage.total_tokens, 128);
    }

    #[test]
    fn missing_content_is_malformed() {
        let body = json!({ "choices": [] });
        let err = parse_completion(&body).unwrap_err();
        assert_eq!(err.cause, ProviderErrorKind::MalformedResponse);
    }

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("ééééé", 2), "éé...");
    }

    #[tokio::test]
    async fn unreachable_host_is_network_failure() {
        let provider = MistralProvider::new("key".to_string())
            .with_base_url("http://127.0.0.1:1/".to_string())
            .with_timeout(Duration::from_secs(5));

        let err = provider
            .complete("sys", &[ChatMessage::new(Role::User, "hi")])
            .await
            .unwrap_err();

        let normalized = ProviderError::from_anyhow(&err);
        assert_eq!(normalized.cause, ProviderErrorKind::Network);
    }
}
