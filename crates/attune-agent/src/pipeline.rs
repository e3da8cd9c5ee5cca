// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The send-message pipeline: compose, complete, append.

use std::sync::Arc;

use attune_core::{AttuneError, EmotionSample, PersistenceWarning};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::composer::PromptComposer;
use crate::gateway::CompletionGateway;
use crate::session::ConversationSession;

/// Assistant turn appended in place of a failed completion.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// What one accepted submission produced.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// Attached to every log record of the submission.
    pub correlation_id: Uuid,
    /// The emotion the user turn was tagged with.
    pub emotion: EmotionSample,
    /// The assistant turn appended: the reply, or [`APOLOGY`].
    pub reply: String,
    /// Why the completion failed, when it did.
    pub failure: Option<AttuneError>,
    pub warnings: Vec<PersistenceWarning>,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// One session's pipeline. Never shared across sessions.
pub struct ChatPipeline {
    session: ConversationSession,
    composer: PromptComposer,
    gateway: Arc<CompletionGateway>,
}

impl ChatPipeline {
    pub fn new(
        session: ConversationSession,
        composer: PromptComposer,
        gateway: Arc<CompletionGateway>,
    ) -> Self {
        Self {
            session,
            composer,
            gateway,
        }
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ConversationSession {
        &mut self.session
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Submits `message` tagged with the latest sampled emotion.
    pub async fn submit(
        &mut self,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, AttuneError> {
        let sample = self.session.current_emotion();
        self.submit_with(message, sample, cancel).await
    }

    /// Submits `message` tagged with `sample`.
    ///
    /// Rejected submissions (`Validation`, `Busy`) touch nothing. Once the
    /// user turn is appended, completion failures are logged and answered
    /// with an [`APOLOGY`] turn, so the outcome is still `Ok`. If `cancel`
    /// fires first the user turn is withdrawn, any late reply is dropped and
    /// `Cancelled` is returned.
    pub async fn submit_with(
        &mut self,
        message: &str,
        sample: EmotionSample,
        cancel: &CancellationToken,
    ) -> Result<SubmitOutcome, AttuneError> {
        let correlation_id = Uuid::new_v4();
        let session_id = self.session.id().clone();

        if self.session.is_busy() {
            warn!(%correlation_id, %session_id, "submission rejected: session busy");
            return Err(AttuneError::Busy);
        }
        let payload = self.composer.compose(message, &sample).inspect_err(|e| {
            warn!(%correlation_id, %session_id, kind = %e.kind(), error = %e, "submission rejected");
        })?;
        self.session.append_user_with(message, sample.clone()).await?;
        info!(
            %correlation_id,
            %session_id,
            emotion = %payload.emotion_label,
            intensity_percent = payload.intensity_percent,
            "submission accepted"
        );

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                self.session.withdraw_pending().await;
                for warning in self.session.drain_warnings() {
                    warn!(%correlation_id, %session_id, %warning, "withdrawal persisted partially");
                }
                info!(%correlation_id, %session_id, "submission cancelled; user turn withdrawn");
                return Err(AttuneError::Cancelled);
            }
            result = self.gateway.complete(&payload) => result,
        };

        let (reply, failure) = match result {
            Ok(text) => {
                info!(%correlation_id, %session_id, chars = text.len(), "completion succeeded");
                (text, None)
            }
            Err(e) => {
                error!(
                    %correlation_id,
                    %session_id,
                    kind = %e.kind(),
                    status = e.status_code(),
                    error = %e,
                    "completion failed; answering with apology"
                );
                (APOLOGY.to_string(), Some(e))
            }
        };
        self.session.append_assistant(&reply).await;

        let warnings = self.session.drain_warnings();
        for warning in &warnings {
            warn!(%correlation_id, %session_id, %warning, "submission persisted partially");
        }
        Ok(SubmitOutcome {
            correlation_id,
            emotion: sample,
            reply,
            failure,
            warnings,
        })
    }
}
