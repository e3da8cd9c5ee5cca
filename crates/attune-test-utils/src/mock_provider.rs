// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider doubles for deterministic testing.
//!
//! `MockProvider` replays scripted replies; `SpyProvider` only counts how
//! often the network boundary would have been crossed.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use attune_core::{
    AdapterType, AttuneError, CompletionRequest, CompletionResponse, HealthStatus, PluginAdapter,
    ProviderAdapter, TokenUsage,
};

/// One scripted reply: text, a contentless answer (`None`), or an error.
pub type MockReply = Result<Option<String>, AttuneError>;

/// A provider that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// `"mock response"` is returned.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Pre-loads successful text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                responses.into_iter().map(|r| Ok(Some(r))).collect(),
            )),
            ..Self::new()
        }
    }

    /// Sleeps this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(Ok(Some(text.into())));
    }

    pub async fn add_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    pub async fn add_error(&self, error: AttuneError) {
        self.replies.lock().await.push_back(Err(error));
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Some("mock response".to_string())))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AttuneError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let content = self.next_reply().await?;
        Ok(CompletionResponse {
            id: format!("mock-resp-{}", self.call_count().await),
            model,
            content,
            finish_reason: Some("stop".to_string()),
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
            }),
        })
    }
}

/// Counts `complete` calls. Optionally reports itself unconfigured.
pub struct SpyProvider {
    configured: bool,
    calls: AtomicUsize,
}

impl SpyProvider {
    pub fn new() -> Self {
        Self {
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider whose credential is missing.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for SpyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for SpyProvider {
    fn name(&self) -> &str {
        "spy-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        Ok(if self.configured {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("missing credential".into())
        })
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for SpyProvider {
    fn ensure_configured(&self) -> Result<(), AttuneError> {
        if self.configured {
            Ok(())
        } else {
            Err(AttuneError::Config("spy provider has no credential".into()))
        }
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AttuneError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CompletionResponse {
            id: "spy".to_string(),
            model: request.model,
            content: Some("spy response".to_string()),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::ChatMessage;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.7,
            max_tokens: 100,
            presence_penalty: None,
            frequency_penalty: None,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request()).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("mock response"));
    }

    #[tokio::test]
    async fn queued_replies_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first".into(), "second".into()]);
        provider.add_error(AttuneError::service("down")).await;
        provider.add_reply(Ok(None)).await;

        let first = provider.complete(request()).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));
        let second = provider.complete(request()).await.unwrap();
        assert_eq!(second.content.as_deref(), Some("second"));
        assert!(provider.complete(request()).await.is_err());
        assert_eq!(provider.complete(request()).await.unwrap().content, None);
        assert_eq!(provider.call_count().await, 4);
    }

    #[tokio::test]
    async fn spy_counts_calls_and_reports_configuration() {
        let spy = SpyProvider::new();
        assert!(spy.ensure_configured().is_ok());
        spy.complete(request()).await.unwrap();
        assert_eq!(spy.calls(), 1);

        let unconfigured = SpyProvider::unconfigured();
        assert!(matches!(unconfigured.ensure_configured(), Err(AttuneError::Config(_))));
        assert_eq!(unconfigured.calls(), 0);
    }
}
