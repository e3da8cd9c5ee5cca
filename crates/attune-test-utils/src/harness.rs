// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete conversation stack: a provider
//! double, a store, an emotion history and a completion gateway. Tests
//! open pipelines against it and drive them like the real surfaces do.

use std::sync::Arc;
use std::time::Duration;

use attune_agent::{
    ChatPipeline, CompletionGateway, CompletionSettings, ConversationSession, EmotionInterpreter,
    PromptComposer, SubmitOutcome,
};
use attune_config::{AttuneConfig, StorageConfig};
use attune_core::{AttuneError, EmotionVocabulary, ProviderAdapter, SessionId, StorageAdapter};
use attune_emotion::HistoryHandle;
use attune_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;

use crate::mock_provider::MockProvider;
use crate::storage::{FailingStorage, MemoryStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageKind {
    Memory,
    Sqlite,
    Failing,
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    provider: Option<Arc<dyn ProviderAdapter>>,
    vocabulary: EmotionVocabulary,
    storage: StorageKind,
    timeout: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            provider: None,
            vocabulary: EmotionVocabulary::default(),
            storage: StorageKind::Memory,
            timeout: None,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Route completions to `provider` instead of the built-in mock.
    pub fn with_provider(mut self, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: EmotionVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Persist to a temporary SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.storage = StorageKind::Sqlite;
        self
    }

    /// Use a store whose every operation fails.
    pub fn with_failing_storage(mut self) -> Self {
        self.storage = StorageKind::Failing;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, AttuneError> {
        let mut config = AttuneConfig::default();
        config.emotion.vocabulary = self.vocabulary;

        let mut temp_dir = None;
        let storage: Arc<dyn StorageAdapter> = match self.storage {
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
            StorageKind::Failing => Arc::new(FailingStorage::new()),
            StorageKind::Sqlite => {
                let dir = tempfile::TempDir::new()
                    .map_err(|e| AttuneError::Storage { source: e.into() })?;
                config.storage = StorageConfig {
                    database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
                    wal_mode: true,
                };
                let sqlite = SqliteStorage::new(config.storage.clone());
                sqlite.initialize().await?;
                temp_dir = Some(dir);
                Arc::new(sqlite)
            }
        };

        let mock_provider = Arc::new(MockProvider::with_responses(self.responses));
        let provider: Arc<dyn ProviderAdapter> = match self.provider {
            Some(provider) => provider,
            None => mock_provider.clone(),
        };

        let mut settings = CompletionSettings::from_config(&config.agent, &config.openai);
        if let Some(timeout) = self.timeout {
            settings.timeout = timeout;
        }
        let gateway = Arc::new(CompletionGateway::new(provider, settings));
        let history = HistoryHandle::new(config.emotion.history_capacity, self.vocabulary);

        Ok(TestHarness {
            mock_provider,
            storage,
            history,
            gateway,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with provider doubles and a store.
pub struct TestHarness {
    /// The mock provider (unused when a custom provider was supplied).
    pub mock_provider: Arc<MockProvider>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Shared emotion history; tests record samples into it directly.
    pub history: HistoryHandle,
    pub gateway: Arc<CompletionGateway>,
    pub config: AttuneConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A session over the harness store, restored from it.
    pub async fn session(&self, id: &str) -> ConversationSession {
        let mut session = ConversationSession::new(
            SessionId(id.to_string()),
            self.history.clone(),
            self.storage.clone(),
        );
        session.restore().await;
        session
    }

    /// A pipeline for session `id`, restored from the store.
    pub async fn pipeline(&self, id: &str) -> ChatPipeline {
        ChatPipeline::new(
            self.session(id).await,
            PromptComposer::new(self.config.emotion.vocabulary),
            self.gateway.clone(),
        )
    }

    /// An interpreter sharing the harness gateway.
    pub fn interpreter(&self) -> EmotionInterpreter {
        EmotionInterpreter::new(
            PromptComposer::new(self.config.emotion.vocabulary),
            self.gateway.clone(),
        )
    }

    /// Submits `text` on a fresh session and returns the outcome.
    pub async fn send_message(&self, text: &str) -> Result<SubmitOutcome, AttuneError> {
        let mut pipeline = self.pipeline(&SessionId::generate().0).await;
        pipeline.submit(text, &CancellationToken::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert!(harness.storage.load_turns("nothing").await.unwrap().is_empty());
        assert!(harness.history.latest().is_none());
    }

    #[tokio::test]
    async fn send_message_uses_mock_responses() {
        let harness = TestHarness::builder()
            .with_mock_responses(vec!["hello there".into()])
            .build()
            .await
            .unwrap();
        let outcome = harness.send_message("hi").await.unwrap();
        assert_eq!(outcome.reply, "hello there");
        assert!(outcome.is_success());
        assert_eq!(harness.mock_provider.call_count().await, 1);
    }

    #[tokio::test]
    async fn sqlite_harness_persists_turns() {
        let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
        let mut pipeline = harness.pipeline("s1").await;
        pipeline.submit("hi", &CancellationToken::new()).await.unwrap();
        let restored = harness.session("s1").await;
        assert_eq!(restored.turns().len(), 2);
    }
}
