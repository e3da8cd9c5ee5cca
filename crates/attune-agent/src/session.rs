// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The append-only conversation log for one chat surface.
//!
//! A session owns its turns and persists the full sequence after every
//! append. Persistence is best-effort: failures become
//! [`PersistenceWarning`]s and the in-memory conversation carries on.
//!
//! At most one user turn may be outstanding. [`append_user`] marks the
//! session busy and [`append_assistant`] clears it; a second
//! [`append_user`] while busy fails with [`AttuneError::Busy`].
//!
//! [`append_user`]: ConversationSession::append_user
//! [`append_assistant`]: ConversationSession::append_assistant

use std::sync::Arc;

use attune_core::{
    AttuneError, ConversationTurn, EmotionSample, PersistenceWarning, Role, SessionId,
    StorageAdapter,
};
use attune_emotion::HistoryHandle;
use chrono::Utc;
use tracing::{debug, info, warn};

pub struct ConversationSession {
    id: SessionId,
    turns: Vec<ConversationTurn>,
    history: HistoryHandle,
    storage: Arc<dyn StorageAdapter>,
    busy: bool,
    warnings: Vec<PersistenceWarning>,
}

impl ConversationSession {
    pub fn new(id: SessionId, history: HistoryHandle, storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            id,
            turns: Vec::new(),
            history,
            storage,
            busy: false,
            warnings: Vec::new(),
        }
    }

    /// Loads previously persisted turns, replacing the in-memory log.
    ///
    /// A trailing unanswered user turn is not restored. A store failure
    /// leaves the session empty and records a warning.
    pub async fn restore(&mut self) -> usize {
        match self.storage.load_turns(self.id.as_str()).await {
            Ok(mut turns) => {
                // A process that died mid-submission leaves an unanswered user turn.
                if turns.last().is_some_and(|t| t.role == Role::User) {
                    turns.pop();
                    warn!(session_id = %self.id, "dropping unanswered user turn from stored session");
                }
                info!(session_id = %self.id, turns = turns.len(), "session restored");
                self.turns = turns;
            }
            Err(e) => {
                self.warn("load_turns", &e);
                self.turns.clear();
            }
        }
        self.turns.len()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The emotion a user turn sent now would be tagged with.
    pub fn current_emotion(&self) -> EmotionSample {
        self.history.latest_or_baseline()
    }

    /// Appends a user turn tagged with the latest sampled emotion.
    pub async fn append_user(&mut self, content: &str) -> Result<ConversationTurn, AttuneError> {
        let sample = self.current_emotion();
        self.append_user_with(content, sample).await
    }

    /// Appends a user turn tagged with an explicit emotion sample.
    pub async fn append_user_with(
        &mut self,
        content: &str,
        sample: EmotionSample,
    ) -> Result<ConversationTurn, AttuneError> {
        if content.trim().is_empty() {
            return Err(AttuneError::Validation("message must not be empty".into()));
        }
        if self.busy {
            return Err(AttuneError::Busy);
        }

        let turn = ConversationTurn {
            role: Role::User,
            content: content.to_string(),
            timestamp: Utc::now(),
            emotion_context: Some(sample),
        };
        self.turns.push(turn.clone());
        self.busy = true;
        debug!(session_id = %self.id, turns = self.turns.len(), "user turn appended");
        self.persist().await;
        Ok(turn)
    }

    /// Appends an assistant turn and clears the busy flag.
    pub async fn append_assistant(&mut self, content: &str) -> ConversationTurn {
        let turn = ConversationTurn {
            role: Role::Assistant,
            content: content.to_string(),
            timestamp: Utc::now(),
            emotion_context: None,
        };
        self.turns.push(turn.clone());
        self.busy = false;
        debug!(session_id = %self.id, turns = self.turns.len(), "assistant turn appended");
        self.persist().await;
        turn
    }

    /// Removes the outstanding user turn and clears the busy flag.
    ///
    /// Used when a submission is abandoned before its reply arrives, so the
    /// log never holds an unanswered user turn followed by another one.
    pub async fn withdraw_pending(&mut self) -> Option<ConversationTurn> {
        if !self.busy {
            return None;
        }
        self.busy = false;
        let withdrawn = match self.turns.last() {
            Some(turn) if turn.role == Role::User => self.turns.pop(),
            _ => None,
        };
        debug!(session_id = %self.id, turns = self.turns.len(), "pending user turn withdrawn");
        self.persist().await;
        withdrawn
    }

    /// Writes the full turn sequence, replacing what the store held.
    async fn persist(&mut self) {
        if let Err(e) = self.storage.save_turns(self.id.as_str(), &self.turns).await {
            self.warn("save_turns", &e);
        }
    }

    fn warn(&mut self, operation: &'static str, err: &AttuneError) {
        let warning = PersistenceWarning::new(operation, err);
        warn!(session_id = %self.id, %warning, "session persistence degraded");
        self.warnings.push(warning);
    }

    /// Takes the warnings accumulated since the last call.
    pub fn drain_warnings(&mut self) -> Vec<PersistenceWarning> {
        std::mem::take(&mut self.warnings)
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("id", &self.id)
            .field("turns", &self.turns.len())
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}
