//! Prompt construction on top of a [`TextProvider`].

use crate::services::providers::{ChatMessage, ProviderError, TextProvider};
use std::sync::Arc;

pub const SYSTEM_PROMPT: &str = "You are a script writer.";

#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn TextProvider>,
    word_limit: u32,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn TextProvider>, word_limit: u32) -> Self {
        Self {
            provider,
            word_limit,
        }
    }

    /// Two-message prompt: the fixed system role plus the synopsis with a
    /// genre hint and a word budget.
    pub fn build_prompt(&self, synopsis: &str, genre: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "{}\n\nGenre: {}. Make this within {} words.",
                synopsis.trim(),
                genre.trim(),
                self.word_limit
            )),
        ]
    }

    /// Generate a script for `synopsis` in `genre`.
    pub async fn generate(&self, synopsis: &str, genre: &str) -> Result<String, ProviderError> {
        let messages = self.build_prompt(synopsis, genre);

        tracing::info!(
            model = %self.provider.model(),
            genre = %genre,
            synopsis_len = synopsis.len(),
            "Requesting script generation"
        );

        let text = self.provider.complete(&messages).await.map_err(|e| {
            tracing::error!(model = %self.provider.model(), "Script generation failed: {}", e);
            e
        })?;

        tracing::info!(output_len = text.len(), "Script generated");
        Ok(text)
    }
}
