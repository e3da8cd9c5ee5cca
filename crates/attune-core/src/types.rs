// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the attune workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::AttuneError;

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random session identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

// --- Emotion types ---

/// Every label any emotion source can produce.
///
/// Labels are only meaningful relative to an [`EmotionVocabulary`]; a
/// deployment picks one vocabulary and rejects labels outside it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Neutral,
    Anxious,
    Calm,
    Stressed,
    Focused,
}

/// A closed set of emotion labels, selected per deployment.
///
/// The two vocabularies overlap only on `anxious` and are deliberately not
/// merged.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmotionVocabulary {
    /// happy / sad / neutral / anxious, produced by the simulated sampler.
    #[default]
    Affect,
    /// calm / anxious / stressed / focused, produced by headset scripts.
    Eeg,
}

const AFFECT_LABELS: [EmotionLabel; 4] = [
    EmotionLabel::Happy,
    EmotionLabel::Sad,
    EmotionLabel::Neutral,
    EmotionLabel::Anxious,
];

const EEG_LABELS: [EmotionLabel; 4] = [
    EmotionLabel::Calm,
    EmotionLabel::Anxious,
    EmotionLabel::Stressed,
    EmotionLabel::Focused,
];

impl EmotionVocabulary {
    /// Labels in their stable enumeration order (used for tie-breaking).
    pub fn labels(&self) -> &'static [EmotionLabel] {
        match self {
            EmotionVocabulary::Affect => &AFFECT_LABELS,
            EmotionVocabulary::Eeg => &EEG_LABELS,
        }
    }

    pub fn contains(&self, label: EmotionLabel) -> bool {
        self.labels().contains(&label)
    }

    /// The label used when no sample has been observed yet.
    pub fn baseline(&self) -> EmotionLabel {
        match self {
            EmotionVocabulary::Affect => EmotionLabel::Neutral,
            EmotionVocabulary::Eeg => EmotionLabel::Calm,
        }
    }

    /// Baseline sample: the vocabulary's neutral label at zero intensity.
    pub fn baseline_sample(&self) -> EmotionSample {
        EmotionSample {
            label: self.baseline(),
            intensity: 0.0,
            observed_at: Utc::now(),
        }
    }

    /// Parses a label and checks it belongs to this vocabulary.
    pub fn parse_label(&self, raw: &str) -> Result<EmotionLabel, AttuneError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AttuneError::Validation("emotion label is required".into()));
        }
        let label: EmotionLabel = trimmed
            .parse()
            .map_err(|_| AttuneError::Validation(format!("unknown emotion label `{trimmed}`")))?;
        if !self.contains(label) {
            return Err(AttuneError::Validation(format!(
                "emotion label `{label}` is not part of the `{self}` vocabulary"
            )));
        }
        Ok(label)
    }
}

/// One `(label, intensity, time)` observation of affective state.
///
/// Immutable once created; `intensity` is always within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEmotionSample")]
pub struct EmotionSample {
    label: EmotionLabel,
    intensity: f64,
    observed_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawEmotionSample {
    label: EmotionLabel,
    intensity: f64,
    observed_at: DateTime<Utc>,
}

impl TryFrom<RawEmotionSample> for EmotionSample {
    type Error = AttuneError;

    fn try_from(raw: RawEmotionSample) -> Result<Self, Self::Error> {
        EmotionSample::at(raw.label, raw.intensity, raw.observed_at)
    }
}

impl EmotionSample {
    /// Creates a sample stamped with the current time.
    pub fn new(label: EmotionLabel, intensity: f64) -> Result<Self, AttuneError> {
        Self::at(label, intensity, Utc::now())
    }

    /// Creates a sample with an explicit observation time.
    pub fn at(
        label: EmotionLabel,
        intensity: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, AttuneError> {
        check_intensity(intensity)?;
        Ok(Self {
            label,
            intensity,
            observed_at,
        })
    }

    pub fn label(&self) -> EmotionLabel {
        self.label
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// Rejects NaN and anything outside `[0, 1]`.
pub fn check_intensity(intensity: f64) -> Result<(), AttuneError> {
    if !(0.0..=1.0).contains(&intensity) {
        return Err(AttuneError::Validation(format!(
            "intensity must be between 0 and 1, got {intensity}"
        )));
    }
    Ok(())
}

// --- Conversation types ---

/// Who authored a turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message exchanged in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Emotion active when a user turn was sent. Always `None` for assistant turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion_context: Option<EmotionSample>,
}

/// The composed instruction for one submission. Stateless, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPayload {
    pub user_message: String,
    pub emotion_label: String,
    pub intensity_percent: u8,
    /// Fully rendered prompt text sent as the user message.
    pub text: String,
}

/// A free-text note written by a reviewer about a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub reviewer_id: String,
    pub subject_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// --- Provider types ---

/// A single role-tagged message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A request to a text-generation provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
}

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A parsed provider response. `content` is the first candidate's text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}
