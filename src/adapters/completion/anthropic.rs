//! Anthropic Messages API completion client.
//!
//! One non-streaming request per prompt; the HTTP client's timeout is the
//! only deadline applied to a completion.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CompletionConfig;
use crate::domain::ports::CompletionClient;

/// Message role in Anthropic API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Content block in a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

/// Request to the Anthropic Messages API.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

/// Usage information from the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Response from the Anthropic Messages API.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

/// Completion client backed by the Anthropic Messages API.
pub struct AnthropicCompletionClient {
    config: CompletionConfig,
    client: Client,
}

impl AnthropicCompletionClient {
    pub fn new(config: CompletionConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get API key from config or environment.
    fn api_key(&self) -> Option<String> {
        self.config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
    }

    fn build_request(&self, prompt: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: MessageRole::User,
                content: vec![ContentBlock::Text { text: prompt.to_string() }],
            }],
        }
    }
}

#[async_trait]
impl CompletionClient for AnthropicCompletionClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> DomainResult<String> {
        let api_key = self
            .api_key()
            .ok_or_else(|| DomainError::CompletionFailed("ANTHROPIC_API_KEY not set".to_string()))?;

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url.trim_end_matches('/')))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| DomainError::CompletionFailed(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::CompletionFailed(format!("API error {}: {}", status, body)));
        }

        let result: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::CompletionFailed(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(
            model = %result.model,
            input_tokens = result.usage.input_tokens,
            output_tokens = result.usage.output_tokens,
            stop_reason = ?result.stop_reason,
            "completion received"
        );

        let text = result
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}
