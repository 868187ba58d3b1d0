//! Chat-completion client for hosted OpenAI-compatible endpoints

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::llm::{ChatMessage, CompletionProvider};

/// Longest error body echoed back to the user
const MAX_ERROR_BODY: usize = 300;

/// Cap on generated tokens for every answer
const MAX_TOKENS: u32 = 2000;

/// Chat-completion API client. One request per call, no retries.
pub struct ChatCompletionClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletionClient {
    /// Create a new client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage], temperature: f32) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages,
            temperature,
            max_tokens: MAX_TOKENS,
        }
    }

    /// Pull `choices[0].message.content` out of a response body
    fn parse_answer(body: &str) -> Result<String> {
        let response: CompletionResponse = serde_json::from_str(body)
            .map_err(|e| Error::llm(format!("Failed to parse completion response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::llm("Completion response contained no answer"))
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionClient {
    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String> {
        let request = self.request_body(messages, temperature);

        tracing::info!(
            "Requesting completion from {} (model: {}, temperature: {:.1})",
            self.config.endpoint,
            self.config.model,
            temperature
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::llm(format!("Failed to read completion response: {}", e)))?;

        if !status.is_success() {
            let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
            return Err(Error::llm(format!("HTTP {} - {}", status, snippet)));
        }

        Self::parse_answer(&body)
    }

    fn name(&self) -> &str {
        "chat-completions"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
