//! Mock provider implementation for testing.

use super::{ChatMessage, ProviderError, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock text provider that answers with a canned completion and records every
/// prompt it receives.
pub struct MockTextProvider {
    reply: Result<String, String>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockTextProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails as an upstream API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .map_err(|e| ProviderError::ApiError(format!("Mock provider mutex poisoned: {}", e)))?
            .push(messages.to_vec());

        self.reply.clone().map_err(ProviderError::ApiError)
    }

    fn model(&self) -> &str {
        "mock"
    }
}
