//! Groq chat-completions client.

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::config::GroqConfig;
use super::messages::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};
use crate::providers::base::{
    CompletionRequest, LanguageModel, ProviderError, ProviderResult,
};

/// User-Agent header value for API requests.
const USER_AGENT: &str = concat!("colloquy-engine/", env!("CARGO_PKG_VERSION"));

/// Chat client for the Groq OpenAI-compatible API.
pub struct GroqChat {
    config: GroqConfig,
    http: Client,
}

impl GroqChat {
    /// Create a client. Fails fast on invalid configuration.
    pub fn new(config: GroqConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::Auth)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Extract a readable message from an error body, falling back to a
    /// truncated raw snippet when the envelope does not decode.
    fn error_message(status: StatusCode, body: &str) -> String {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(envelope) => format!("{status}: {}", envelope.error.message),
            Err(_) => {
                let snippet: String = body.chars().take(200).collect();
                format!("{status}: {snippet}")
            }
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for GroqChat {
    async fn complete(&self, request: CompletionRequest) -> ProviderResult<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(request.prompt));

        let body = ChatRequest {
            model: request.model.unwrap_or_else(|| self.config.model.clone()),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %body.model, "sending chat completion request");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.config.timeout))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(Self::error_message(status, &body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "chat completion request failed");
            return Err(ProviderError::Transport(Self::error_message(status, &body)));
        }

        let decoded: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("undecodable completion body: {e}")))?;

        decoded
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::Malformed("completion contained no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_api_key() {
        let result = GroqChat::new(GroqConfig::new(""));
        assert!(matches!(result, Err(ProviderError::Auth(_))));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client =
            GroqChat::new(GroqConfig::new("gsk_test").with_base_url("http://localhost:9/v1/"))
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn test_error_message_prefers_api_envelope() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        let message = GroqChat::error_message(StatusCode::UNAUTHORIZED, body);
        assert!(message.contains("Invalid API Key"));
    }

    #[test]
    fn test_error_message_falls_back_to_snippet() {
        let message = GroqChat::error_message(StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        assert!(message.contains("502"));
        assert!(message.contains("upstream"));
    }
}
