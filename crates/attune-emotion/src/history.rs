// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded sliding window of recent emotion samples.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwapOption;
use attune_core::{EmotionLabel, EmotionSample, EmotionVocabulary};
use serde::Serialize;

/// Rendered in place of a dominant label when the history is empty.
pub const NO_DOMINANT_LABEL: &str = "-";

/// Default window size.
pub const DEFAULT_CAPACITY: usize = 20;

/// The most recent `capacity` samples, oldest first.
///
/// Pure sliding window: once full, each `record` evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct EmotionHistory {
    samples: VecDeque<EmotionSample>,
    capacity: usize,
    vocabulary: EmotionVocabulary,
}

impl EmotionHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, vocabulary: EmotionVocabulary) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            vocabulary,
        }
    }

    pub fn record(&mut self, sample: EmotionSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn snapshot(&self) -> Vec<EmotionSample> {
        self.samples.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&EmotionSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean intensity, or 0 when empty.
    pub fn average_intensity(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.intensity()).sum::<f64>() / self.samples.len() as f64
    }

    /// Most frequent label; ties go to the label listed first by the vocabulary.
    pub fn dominant_label(&self) -> Option<EmotionLabel> {
        let mut counts: HashMap<EmotionLabel, usize> = HashMap::new();
        for sample in &self.samples {
            *counts.entry(sample.label()).or_default() += 1;
        }

        let mut best: Option<(EmotionLabel, usize)> = None;
        let ordered = self
            .vocabulary
            .labels()
            .iter()
            .copied()
            .chain(self.samples.iter().map(|s| s.label()));
        for label in ordered {
            let count = counts.get(&label).copied().unwrap_or(0);
            if count > 0 && best.is_none_or(|(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }

    pub fn stats(&self) -> EmotionStats {
        EmotionStats {
            latest: self.latest().cloned(),
            average_intensity: self.average_intensity(),
            dominant_label: self
                .dominant_label()
                .map(|l| l.to_string())
                .unwrap_or_else(|| NO_DOMINANT_LABEL.to_string()),
            samples: self.samples.len(),
        }
    }
}

/// Read-only summary of a history at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionStats {
    pub latest: Option<EmotionSample>,
    pub average_intensity: f64,
    /// Label name, or [`NO_DOMINANT_LABEL`].
    pub dominant_label: String,
    pub samples: usize,
}

/// Shared handle to one history plus a lock-free copy of its latest sample.
///
/// The sampler is the only writer. Readers of [`latest`](Self::latest) never
/// touch the mutex.
#[derive(Clone)]
pub struct HistoryHandle {
    inner: Arc<Shared>,
}

struct Shared {
    history: Mutex<EmotionHistory>,
    latest: ArcSwapOption<EmotionSample>,
    vocabulary: EmotionVocabulary,
}

impl HistoryHandle {
    pub fn new(capacity: usize, vocabulary: EmotionVocabulary) -> Self {
        Self {
            inner: Arc::new(Shared {
                history: Mutex::new(EmotionHistory::new(capacity, vocabulary)),
                latest: ArcSwapOption::empty(),
                vocabulary,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EmotionHistory> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.inner
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, sample: EmotionSample) {
        let latest = Arc::new(sample.clone());
        self.lock().record(sample);
        self.inner.latest.store(Some(latest));
    }

    pub fn latest(&self) -> Option<Arc<EmotionSample>> {
        self.inner.latest.load_full()
    }

    /// Latest sample, or the vocabulary's baseline when nothing was sampled yet.
    pub fn latest_or_baseline(&self) -> EmotionSample {
        match self.latest() {
            Some(sample) => (*sample).clone(),
            None => self.inner.vocabulary.baseline_sample(),
        }
    }

    pub fn snapshot(&self) -> Vec<EmotionSample> {
        self.lock().snapshot()
    }

    pub fn stats(&self) -> EmotionStats {
        self.lock().stats()
    }

    pub fn vocabulary(&self) -> EmotionVocabulary {
        self.inner.vocabulary
    }
}

impl std::fmt::Debug for HistoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryHandle")
            .field("vocabulary", &self.inner.vocabulary)
            .field("latest", &self.latest())
            .finish()
    }
}
