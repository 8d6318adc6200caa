//! OpenAI chat-completions provider.

use super::{ChatMessage, ProviderError, TextProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiTextProvider {
    settings: OpenAiSettings,
    client: Client,
}

impl OpenAiTextProvider {
    pub fn new(settings: OpenAiSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl TextProvider for OpenAiTextProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        if self.settings.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "OpenAI API key not configured".to_string(),
            ));
        }

        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages,
        };

        tracing::debug!(
            model = %self.settings.model,
            message_count = messages.len(),
            "Sending request to chat completions API"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Chat completions API error {}: {}",
                status, error_text
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderError::EmptyCompletion)
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

// ============================================================================
// Chat Completions API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn provider(base_url: String, api_key: &str) -> OpenAiTextProvider {
        OpenAiTextProvider::new(OpenAiSettings {
            api_key: api_key.to_string(),
            base_url,
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn prompt() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are a script writer."),
            ChatMessage::user("A heist on the moon"),
        ]
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": "You are a script writer." },
                    { "role": "user", "content": "A heist on the moon" }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"FADE IN"}},{"message":{"role":"assistant","content":"ignored"}}]}"#,
            )
            .create_async()
            .await;

        let text = provider(server.url(), "sk-test")
            .complete(&prompt())
            .await
            .unwrap();

        assert_eq!(text, "FADE IN");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let err = provider(server.url(), "sk-test")
            .complete(&prompt())
            .await
            .unwrap_err();

        match err {
            ProviderError::ApiError(msg) => assert!(msg.contains("upstream exploded")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .create_async()
            .await;

        let err = provider(server.url(), "sk-test")
            .complete(&prompt())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn empty_choices_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = provider(server.url(), "sk-test")
            .complete(&prompt())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::EmptyCompletion));
    }

    #[tokio::test]
    async fn missing_api_key_skips_the_call() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let err = provider(server.url(), "")
            .complete(&prompt())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NotConfigured(_)));
        mock.assert_async().await;
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let p = provider("https://api.example.com/v1/".to_string(), "k");
        assert_eq!(p.completions_url(), "https://api.example.com/v1/chat/completions");
    }
}
