//! Chat-completion provider abstractions and implementations.
//!
//! The service only needs "messages in, text out"; the trait keeps the
//! OpenAI client swappable for the mock in tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Completion contained no choices")]
    EmptyCompletion,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => {
                tracing::error!("Generation provider not configured: {}", msg);
                AppError::ServiceUnavailable
            }
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One entry of a chat prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for chat-completion providers (e.g., OpenAI).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send the prompt and return the first completion's text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("x")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "system", "content": "x" }));
    }

    #[test]
    fn not_configured_is_service_unavailable() {
        let err = AppError::from(ProviderError::NotConfigured("no key".into()));
        assert!(matches!(err, AppError::ServiceUnavailable));
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        for err in [
            ProviderError::ApiError("500".into()),
            ProviderError::RateLimited,
            ProviderError::EmptyCompletion,
            ProviderError::NetworkError("reset".into()),
        ] {
            assert!(matches!(AppError::from(err), AppError::BadGateway(_)));
        }
    }
}
