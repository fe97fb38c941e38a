//! Completion client adapters.

pub mod anthropic;
pub mod mock;

use std::sync::Arc;

pub use anthropic::AnthropicCompletionClient;
pub use mock::{MockCompletionClient, MockReply};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CompletionConfig;
use crate::domain::ports::CompletionClient;

/// Build the completion client named by `config.provider`.
pub fn build_completion_client(config: &CompletionConfig) -> DomainResult<Arc<dyn CompletionClient>> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicCompletionClient::new(config.clone())?)),
        "mock" => Ok(Arc::new(MockCompletionClient::new())),
        other => Err(DomainError::ValidationFailed(format!("unknown completion provider: {other}"))),
    }
}
