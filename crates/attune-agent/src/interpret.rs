// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured interpretation of a single emotion reading.
//!
//! The service is asked for three labelled sections and the reply is split
//! back into an [`Interpretation`]. A reply missing any section is a
//! `MalformedResponse`.

use std::sync::Arc;

use attune_core::{AttuneError, EmotionSample};
use serde::{Deserialize, Serialize};

use crate::composer::{PromptComposer, intensity_percent};
use crate::gateway::CompletionGateway;

pub const INTERPRETER_PERSONA: &str = "You are an empathetic AI therapist who provides \
supportive, personalized responses to help people understand and manage their emotions.";

/// Interpretations are longer than chat replies.
pub const INTERPRETATION_MAX_TOKENS: u32 = 500;

const SECTIONS: [&str; 3] = ["MESSAGE:", "EXPLANATION:", "SUGGESTION:"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    /// A short empathetic response.
    pub message: String,
    /// What the emotion might mean.
    pub explanation: String,
    /// One actionable way to manage it.
    pub suggestion: String,
}

/// Splits a `MESSAGE: / EXPLANATION: / SUGGESTION:` reply into its sections.
pub fn parse_interpretation(text: &str) -> Result<Interpretation, AttuneError> {
    let mut starts = [0usize; SECTIONS.len()];
    let mut from = 0;
    for (slot, marker) in starts.iter_mut().zip(SECTIONS) {
        let Some(offset) = text[from..].find(marker) else {
            return Err(malformed(format!("reply has no `{marker}` section")));
        };
        *slot = from + offset;
        from = *slot + marker.len();
    }

    let section = |i: usize| -> Result<String, AttuneError> {
        let begin = starts[i] + SECTIONS[i].len();
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let body = text[begin..end].trim();
        if body.is_empty() {
            return Err(malformed(format!("`{}` section is empty", SECTIONS[i])));
        }
        Ok(body.to_string())
    };

    Ok(Interpretation {
        message: section(0)?,
        explanation: section(1)?,
        suggestion: section(2)?,
    })
}

fn malformed(message: String) -> AttuneError {
    AttuneError::MalformedResponse {
        message,
        source: None,
    }
}

/// Asks the completion service what a reading means.
pub struct EmotionInterpreter {
    composer: PromptComposer,
    gateway: Arc<CompletionGateway>,
}

impl EmotionInterpreter {
    pub fn new(composer: PromptComposer, gateway: Arc<CompletionGateway>) -> Self {
        Self { composer, gateway }
    }

    /// The prompt for `sample`. Deterministic.
    pub fn prompt(&self, sample: &EmotionSample) -> Result<String, AttuneError> {
        let vocabulary = self.composer.vocabulary();
        if !vocabulary.contains(sample.label()) {
            return Err(AttuneError::Validation(format!(
                "emotion label `{}` is not part of the `{vocabulary}` vocabulary",
                sample.label()
            )));
        }
        let percent = intensity_percent(sample.intensity())?;
        Ok(format!(
            "Respond to someone feeling {label} with an intensity level of {percent}/100.\n\
             Please provide:\n\
             1. A brief, empathetic response (1-2 sentences)\n\
             2. A short explanation of what this emotion might mean (2-3 sentences)\n\
             3. A specific, actionable suggestion for managing this emotion (1-2 sentences)\n\n\
             Format your response exactly like this:\n\
             MESSAGE: [your empathetic response]\n\
             EXPLANATION: [your explanation]\n\
             SUGGESTION: [your suggestion]",
            label = sample.label()
        ))
    }

    pub async fn interpret(&self, sample: &EmotionSample) -> Result<Interpretation, AttuneError> {
        let prompt = self.prompt(sample)?;
        let reply = self
            .gateway
            .complete_with(INTERPRETER_PERSONA, &prompt, INTERPRETATION_MAX_TOKENS)
            .await?;
        parse_interpretation(&reply)
    }
}
