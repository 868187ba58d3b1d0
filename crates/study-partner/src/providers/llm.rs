//! Completion provider trait for generating answers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Role;

/// One chat-style message sent to the completion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User.as_str().to_string(),
            content: content.into(),
        }
    }
}

/// Trait for chat-completion answer generation
///
/// Implementations:
/// - `ChatCompletionClient`: hosted OpenAI-compatible endpoint (Groq by default)
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one completion request and return the answer text.
    /// Failures are returned as-is; callers decide whether to retry.
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
