//! Scripted LLM client for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use assistant_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this content and usage
    Content { content: String, usage: LlmUsage },
    /// Fail like a transport/API error would
    Failure(String),
}

/// Mock client replaying scripted replies in order.
///
/// Every request is recorded, including the ones that fail, so tests can
/// assert on what reached the backend. When the script runs out the client
/// fails with an LLM error.
#[derive(Debug)]
pub struct MockLlmClient {
    provider: String,
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    /// Create a mock reporting `provider` as its name.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn with_reply(self, content: impl Into<String>, usage: LlmUsage) -> Self {
        self.push(MockReply::Content {
            content: content.into(),
            usage,
        });
        self
    }

    /// Queue a failing reply.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Failure(message.into()));
        self
    }

    /// Queue a reply on a shared client.
    pub fn push(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<LlmRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

// A poisoned lock only means another test thread panicked mid-call
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        lock(&self.requests).push(request.clone());

        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(MockReply::Content { content, usage }) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage,
            }),
            Some(MockReply::Failure(message)) => Err(AppError::Llm(message)),
            None => Err(AppError::Llm(format!(
                "Mock {} client has no scripted reply",
                self.provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_and_records_requests() {
        let client = MockLlmClient::new("ollama")
            .with_reply("first", LlmUsage::new(1, 1))
            .with_failure("connection refused");

        let first = client.complete(&LlmRequest::new("a", "llama3")).await.unwrap();
        assert_eq!(first.content, "first");
        assert_eq!(first.model, "llama3");

        let second = client.complete(&LlmRequest::new("b", "llama3")).await;
        assert!(matches!(second, Err(AppError::Llm(_))));

        let exhausted = client.complete(&LlmRequest::new("c", "llama3")).await;
        assert!(exhausted.is_err());

        assert_eq!(client.call_count(), 3);
        assert_eq!(client.requests()[1].prompt, "b");
    }
}
