// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sampler task: pulls from one source and fans out to the history
//! (and optionally the store).

use std::sync::Arc;

use attune_core::{EmotionSource, PersistenceWarning, StorageAdapter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::history::HistoryHandle;

/// Where emitted samples are logged, and under which identity.
#[derive(Clone)]
pub struct SampleRecorder {
    pub storage: Arc<dyn StorageAdapter>,
    pub user_id: String,
}

/// Drives an [`EmotionSource`] until it is exhausted or cancelled.
pub struct EmotionSampler {
    source: Box<dyn EmotionSource>,
    history: HistoryHandle,
    recorder: Option<SampleRecorder>,
}

impl EmotionSampler {
    pub fn new(source: Box<dyn EmotionSource>, history: HistoryHandle) -> Self {
        Self {
            source,
            history,
            recorder: None,
        }
    }

    /// Also append every emitted sample to `recorder.storage`.
    pub fn with_recorder(mut self, recorder: SampleRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Runs on a fresh tokio task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<u64> {
        tokio::spawn(self.run(cancel))
    }

    /// Returns the number of samples emitted.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        let source_name = self.source.name().to_string();
        let vocabulary = self.history.vocabulary();
        if self.source.vocabulary() != vocabulary {
            warn!(
                source = %source_name,
                source_vocabulary = %self.source.vocabulary(),
                history_vocabulary = %vocabulary,
                "source and history vocabularies differ; foreign labels will be dropped"
            );
        }
        info!(source = %source_name, %vocabulary, "emotion sampler started");

        let mut emitted = 0u64;
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                next = self.source.next_sample() => next,
            };
            let Some(sample) = next else {
                info!(source = %source_name, emitted, "emotion source exhausted");
                break;
            };
            if !vocabulary.contains(sample.label()) {
                warn!(label = %sample.label(), "dropping sample outside the active vocabulary");
                continue;
            }

            debug!(label = %sample.label(), intensity = sample.intensity(), "emotion sampled");
            self.history.record(sample.clone());
            emitted += 1;

            if let Some(recorder) = &self.recorder
                && let Err(e) = recorder.storage.record_emotion(&recorder.user_id, &sample).await
            {
                let warning = PersistenceWarning::new("record_emotion", &e);
                warn!(user_id = %recorder.user_id, %warning, "emotion sample not persisted");
            }
        }
        info!(source = %source_name, emitted, "emotion sampler stopped");
        emitted
    }
}
