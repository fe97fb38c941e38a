//! Completion port - interface for text-generation backends.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// A synchronous text-completion backend.
///
/// Calls may take seconds and may fail with a network error; a failure is
/// fatal only to the request that issued it.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Send `prompt` and return the raw reply text.
    async fn complete(&self, prompt: &str) -> DomainResult<String>;
}
