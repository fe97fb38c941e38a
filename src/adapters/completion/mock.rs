//! Mock completion client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::CompletionClient;

/// Scripted reply for one completion call.
#[derive(Debug, Clone)]
pub struct MockReply {
    /// Output text
    pub output: String,
    /// Whether to simulate failure
    pub fail: bool,
    /// Error message if failing
    pub error_message: Option<String>,
    /// Simulated latency
    pub delay: Option<Duration>,
}

impl Default for MockReply {
    fn default() -> Self {
        Self {
            output: "Title: Mock guide\nContent: Mock guide content.".to_string(),
            fail: false,
            error_message: None,
            delay: None,
        }
    }
}

impl MockReply {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            fail: true,
            error_message: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Mock completion client. Serves queued replies first, then the default.
pub struct MockCompletionClient {
    default_reply: MockReply,
    queued: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::with_default_reply(MockReply::default())
    }

    pub fn with_default_reply(reply: MockReply) -> Self {
        Self {
            default_reply: reply,
            queued: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a reply for the next unserved call.
    pub fn push_reply(&self, reply: MockReply) {
        self.queued.lock().unwrap_or_else(|e| e.into_inner()).push_back(reply);
    }

    /// Number of `complete` calls started so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn next_reply(&self) -> MockReply {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        let reply = self.next_reply();
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        if reply.fail {
            return Err(DomainError::CompletionFailed(
                reply.error_message.unwrap_or_else(|| "Mock failure".to_string()),
            ));
        }
        Ok(reply.output)
    }
}
