// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion sampling for the attune companion.
//!
//! A single [`EmotionSampler`] task pulls [`EmotionSample`]s from one
//! configured source (random, scripted or push) and records them into a
//! shared [`HistoryHandle`]. Everything downstream only reads.
//!
//! [`EmotionSample`]: attune_core::EmotionSample

pub mod history;
pub mod sampler;
pub mod source;

pub use history::{EmotionHistory, EmotionStats, HistoryHandle, NO_DOMINANT_LABEL};
pub use sampler::{EmotionSampler, SampleRecorder};
pub use source::{PushSource, RandomSource, ScriptedSource, build_source};
