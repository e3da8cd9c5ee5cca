// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion source trait.

use async_trait::async_trait;

use crate::types::{EmotionSample, EmotionVocabulary};

/// A producer of emotion samples.
///
/// Owned by exactly one sampler task, hence `&mut self`. Sources decide
/// their own pacing: `next_sample` waits until the next observation is due.
#[async_trait]
pub trait EmotionSource: Send + 'static {
    fn name(&self) -> &str;

    /// The vocabulary every sample from this source belongs to.
    fn vocabulary(&self) -> EmotionVocabulary;

    /// Waits for and returns the next sample.
    ///
    /// `None` means the source is exhausted and the sampler should stop.
    async fn next_sample(&mut self) -> Option<EmotionSample>;
}
