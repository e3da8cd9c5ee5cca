// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::AttuneError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Annotation, ConversationTurn, EmotionSample};

/// Adapter for conversation, emotion and annotation persistence.
///
/// Every write is best-effort from the caller's point of view: sessions log
/// failures and keep going.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, pragmas).
    async fn initialize(&self) -> Result<(), AttuneError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), AttuneError>;

    /// Loads every turn of a session in chronological order.
    ///
    /// Unknown sessions yield an empty list.
    async fn load_turns(&self, session_id: &str) -> Result<Vec<ConversationTurn>, AttuneError>;

    /// Replaces the stored turns of a session with `turns`, atomically.
    async fn save_turns(
        &self,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<(), AttuneError>;

    /// Appends one emotion sample to a user's record.
    async fn record_emotion(&self, user_id: &str, sample: &EmotionSample)
    -> Result<(), AttuneError>;

    /// Returns up to `limit` of a user's most recent samples, oldest first.
    async fn list_emotions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<EmotionSample>, AttuneError>;

    async fn add_annotation(&self, annotation: &Annotation) -> Result<(), AttuneError>;

    /// Notes a reviewer wrote about a subject, newest first.
    async fn list_annotations(
        &self,
        reviewer_id: &str,
        subject_id: &str,
    ) -> Result<Vec<Annotation>, AttuneError>;
}
