// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage doubles: an in-memory store and one that always fails.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use attune_core::{
    AdapterType, Annotation, AttuneError, ConversationTurn, EmotionSample, HealthStatus,
    PluginAdapter, StorageAdapter,
};

#[derive(Default)]
struct Tables {
    turns: HashMap<String, Vec<ConversationTurn>>,
    emotions: HashMap<String, Vec<EmotionSample>>,
    annotations: Vec<Annotation>,
}

/// A `StorageAdapter` backed by plain maps.
#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_turns` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), AttuneError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), AttuneError> {
        Ok(())
    }

    async fn load_turns(&self, session_id: &str) -> Result<Vec<ConversationTurn>, AttuneError> {
        Ok(self.tables().turns.get(session_id).cloned().unwrap_or_default())
    }

    async fn save_turns(
        &self,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<(), AttuneError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.tables()
            .turns
            .insert(session_id.to_string(), turns.to_vec());
        Ok(())
    }

    async fn record_emotion(
        &self,
        user_id: &str,
        sample: &EmotionSample,
    ) -> Result<(), AttuneError> {
        self.tables()
            .emotions
            .entry(user_id.to_string())
            .or_default()
            .push(sample.clone());
        Ok(())
    }

    async fn list_emotions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<EmotionSample>, AttuneError> {
        let tables = self.tables();
        let samples = tables.emotions.get(user_id).map(Vec::as_slice).unwrap_or_default();
        Ok(samples[samples.len().saturating_sub(limit)..].to_vec())
    }

    async fn add_annotation(&self, annotation: &Annotation) -> Result<(), AttuneError> {
        let mut tables = self.tables();
        if tables.annotations.iter().any(|a| a.id == annotation.id) {
            return Err(AttuneError::Storage {
                source: format!("annotation {} already exists", annotation.id).into(),
            });
        }
        tables.annotations.push(annotation.clone());
        Ok(())
    }

    async fn list_annotations(
        &self,
        reviewer_id: &str,
        subject_id: &str,
    ) -> Result<Vec<Annotation>, AttuneError> {
        let tables = self.tables();
        // Insertion order breaks created_at ties, newest first.
        let mut notes: Vec<(usize, Annotation)> = tables
            .annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.reviewer_id == reviewer_id && a.subject_id == subject_id)
            .map(|(i, a)| (i, a.clone()))
            .collect();
        notes.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        Ok(notes.into_iter().map(|(_, a)| a).collect())
    }
}

/// A `StorageAdapter` whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingStorage;

impl FailingStorage {
    pub fn new() -> Self {
        Self
    }

    fn offline<T>() -> Result<T, AttuneError> {
        Err(AttuneError::Storage {
            source: "storage offline".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for FailingStorage {
    fn name(&self) -> &str {
        "failing"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        Ok(HealthStatus::Unhealthy("storage offline".into()))
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for FailingStorage {
    async fn initialize(&self) -> Result<(), AttuneError> {
        Self::offline()
    }

    async fn close(&self) -> Result<(), AttuneError> {
        Ok(())
    }

    async fn load_turns(&self, _session_id: &str) -> Result<Vec<ConversationTurn>, AttuneError> {
        Self::offline()
    }

    async fn save_turns(
        &self,
        _session_id: &str,
        _turns: &[ConversationTurn],
    ) -> Result<(), AttuneError> {
        Self::offline()
    }

    async fn record_emotion(
        &self,
        _user_id: &str,
        _sample: &EmotionSample,
    ) -> Result<(), AttuneError> {
        Self::offline()
    }

    async fn list_emotions(
        &self,
        _user_id: &str,
        _limit: usize,
    ) -> Result<Vec<EmotionSample>, AttuneError> {
        Self::offline()
    }

    async fn add_annotation(&self, _annotation: &Annotation) -> Result<(), AttuneError> {
        Self::offline()
    }

    async fn list_annotations(
        &self,
        _reviewer_id: &str,
        _subject_id: &str,
    ) -> Result<Vec<Annotation>, AttuneError> {
        Self::offline()
    }
}
