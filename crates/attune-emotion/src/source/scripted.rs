// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Playback of a pre-recorded headset session.
//!
//! Recording format:
//!
//! ```json
//! { "data": [ { "emotion": "calm", "intensity": 0.42, "timestamp": "2024-03-15T10:00:00Z" } ] }
//! ```
//!
//! Recorded timestamps only document the original capture; played-back
//! samples are stamped with the time they are emitted.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use attune_core::{AttuneError, EmotionLabel, EmotionSample, EmotionSource, EmotionVocabulary};
use serde::Deserialize;
use tokio::time::Interval;
use tracing::info;

use super::cadence_interval;

#[derive(Debug, Deserialize)]
struct Recording {
    data: Vec<RecordedEntry>,
}

#[derive(Debug, Deserialize)]
struct RecordedEntry {
    emotion: String,
    intensity: f64,
}

/// Steps through a finite sequence at a fixed cadence.
///
/// Stops once exhausted unless [`looping`](Self::looping) is enabled.
pub struct ScriptedSource {
    entries: Vec<(EmotionLabel, f64)>,
    position: usize,
    looping: bool,
    vocabulary: EmotionVocabulary,
    interval: Interval,
}

impl ScriptedSource {
    /// Reads and validates a recording from disk.
    pub fn load(
        path: impl AsRef<Path>,
        vocabulary: EmotionVocabulary,
        cadence: Duration,
    ) -> Result<Self, AttuneError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AttuneError::Config(format!("cannot read emotion script {}: {e}", path.display()))
        })?;
        let source = Self::from_json(&raw, vocabulary, cadence)?;
        info!(path = %path.display(), entries = source.entries.len(), "emotion script loaded");
        Ok(source)
    }

    /// Parses a recording. Every entry must use a label of `vocabulary` and
    /// an intensity in `[0, 1]`.
    pub fn from_json(
        raw: &str,
        vocabulary: EmotionVocabulary,
        cadence: Duration,
    ) -> Result<Self, AttuneError> {
        let recording: Recording = serde_json::from_str(raw)
            .map_err(|e| AttuneError::Validation(format!("invalid emotion script: {e}")))?;

        let entries = recording
            .data
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                let label = vocabulary
                    .parse_label(&entry.emotion)
                    .map_err(|e| AttuneError::Validation(format!("script entry {i}: {e}")))?;
                attune_core::check_intensity(entry.intensity)
                    .map_err(|e| AttuneError::Validation(format!("script entry {i}: {e}")))?;
                Ok((label, entry.intensity))
            })
            .collect::<Result<Vec<_>, AttuneError>>()?;

        Ok(Self {
            entries,
            position: 0,
            looping: false,
            vocabulary,
            interval: cadence_interval(cadence),
        })
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl EmotionSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn vocabulary(&self) -> EmotionVocabulary {
        self.vocabulary
    }

    async fn next_sample(&mut self) -> Option<EmotionSample> {
        if self.position >= self.entries.len() {
            if !self.looping || self.entries.is_empty() {
                return None;
            }
            self.position = 0;
        }
        self.interval.tick().await;
        let (label, intensity) = self.entries[self.position];
        self.position += 1;
        EmotionSample::new(label, intensity).ok()
    }
}
