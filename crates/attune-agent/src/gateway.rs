// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion gateway: one composed prompt in, one usable reply out.
//!
//! Each [`CompletionGateway::complete`] call walks a fresh
//! `Idle -> Sending -> Succeeded | Failed` state machine. Nothing is retried
//! here; retrying a failed submission is up to the caller.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use attune_config::{AgentConfig, OpenAiConfig};
use attune_core::{
    AttuneError, ChatMessage, CompletionRequest, CompletionResponse, ErrorKind, PromptPayload,
    ProviderAdapter,
};
use tracing::debug;

use crate::composer::DEFAULT_PERSONA;

/// Request parameters shared by every call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub persona: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    /// Upper bound on one round trip.
    pub timeout: Duration,
}

impl CompletionSettings {
    pub fn from_config(agent: &AgentConfig, openai: &OpenAiConfig) -> Self {
        Self {
            persona: agent
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
            model: openai.model.clone(),
            temperature: openai.temperature,
            max_tokens: openai.max_tokens,
            presence_penalty: openai.presence_penalty,
            frequency_penalty: openai.frequency_penalty,
            timeout: Duration::from_secs(openai.timeout_secs),
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default(), &OpenAiConfig::default())
    }
}

/// States of a single completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Idle,
    Sending,
    Succeeded,
    Failed(ErrorKind),
}

impl fmt::Display for CompletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionState::Idle => write!(f, "idle"),
            CompletionState::Sending => write!(f, "sending"),
            CompletionState::Succeeded => write!(f, "succeeded"),
            CompletionState::Failed(kind) => write!(f, "failed({kind})"),
        }
    }
}

/// Tracks one call's progress. Terminal states are never left.
#[derive(Debug)]
struct CompletionCall {
    state: CompletionState,
}

impl CompletionCall {
    fn new() -> Self {
        Self {
            state: CompletionState::Idle,
        }
    }

    fn advance(&mut self, next: CompletionState) {
        debug_assert!(
            matches!(
                (self.state, next),
                (CompletionState::Idle, CompletionState::Sending)
                    | (CompletionState::Idle, CompletionState::Failed(_))
                    | (CompletionState::Sending, CompletionState::Succeeded)
                    | (CompletionState::Sending, CompletionState::Failed(_))
            ),
            "illegal completion transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "completion state");
        self.state = next;
    }

    /// Records the terminal state for `result` and hands it back.
    fn finish<T>(&mut self, result: Result<T, AttuneError>) -> Result<T, AttuneError> {
        match &result {
            Ok(_) => self.advance(CompletionState::Succeeded),
            Err(e) => self.advance(CompletionState::Failed(e.kind())),
        }
        result
    }
}

/// Sends composed prompts to a [`ProviderAdapter`] and enforces the reply contract.
pub struct CompletionGateway {
    provider: Arc<dyn ProviderAdapter>,
    settings: CompletionSettings,
}

impl CompletionGateway {
    pub fn new(provider: Arc<dyn ProviderAdapter>, settings: CompletionSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// The wire request for `payload`: persona system message, then the prompt.
    pub fn build_request(&self, payload: &PromptPayload) -> CompletionRequest {
        self.request_for(&self.settings.persona, &payload.text, self.settings.max_tokens)
    }

    fn request_for(&self, persona: &str, prompt: &str, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::system(persona), ChatMessage::user(prompt)],
            temperature: self.settings.temperature,
            max_tokens,
            presence_penalty: self.settings.presence_penalty,
            frequency_penalty: self.settings.frequency_penalty,
        }
    }

    /// Returns the generated reply verbatim.
    ///
    /// Fails with `Config` before any network traffic when the provider is
    /// not configured, `Service` on upstream errors and timeouts,
    /// `EmptyResponse` when the reply has no usable text and
    /// `MalformedResponse` when it cannot be parsed.
    pub async fn complete(&self, payload: &PromptPayload) -> Result<String, AttuneError> {
        self.send(self.build_request(payload)).await
    }

    /// Like [`complete`](Self::complete), with a caller-chosen persona and token bound.
    pub async fn complete_with(
        &self,
        persona: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, AttuneError> {
        self.send(self.request_for(persona, prompt, max_tokens)).await
    }

    async fn send(&self, request: CompletionRequest) -> Result<String, AttuneError> {
        let mut call = CompletionCall::new();
        if let Err(e) = self.provider.ensure_configured() {
            return call.finish(Err(e));
        }

        call.advance(CompletionState::Sending);
        let outcome = match tokio::time::timeout(self.settings.timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(AttuneError::service(format!(
                "completion timed out after {}s",
                self.settings.timeout.as_secs_f64()
            ))),
        };
        call.finish(outcome.and_then(usable_content))
    }
}

/// Blank or missing content is an error, never an empty success.
fn usable_content(response: CompletionResponse) -> Result<String, AttuneError> {
    match response.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AttuneError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content: Option<&str>) -> CompletionResponse {
        CompletionResponse {
            id: "r1".into(),
            model: "m".into(),
            content: content.map(str::to_string),
            finish_reason: Some("stop".into()),
            usage: None,
        }
    }

    #[test]
    fn usable_content_is_verbatim() {
        assert_eq!(usable_content(response(Some("  hi  "))).unwrap(), "  hi  ");
    }

    #[test]
    fn missing_or_blank_content_is_empty_response() {
        for content in [None, Some(""), Some(" \n ")] {
            assert!(matches!(
                usable_content(response(content)),
                Err(AttuneError::EmptyResponse)
            ));
        }
    }

    #[test]
    fn default_settings_follow_config_defaults() {
        let settings = CompletionSettings::default();
        assert_eq!(settings.persona, DEFAULT_PERSONA);
        assert_eq!(settings.model, "gpt-4-turbo-preview");
        assert_eq!(settings.max_tokens, 200);
        assert_eq!(settings.presence_penalty, Some(0.6));
        assert_eq!(settings.frequency_penalty, Some(0.3));
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn persona_override_is_used() {
        let agent = AgentConfig {
            system_prompt: Some("Be brief.".into()),
            ..AgentConfig::default()
        };
        let settings = CompletionSettings::from_config(&agent, &OpenAiConfig::default());
        assert_eq!(settings.persona, "Be brief.");
    }

    #[test]
    fn call_states_render() {
        let mut call = CompletionCall::new();
        call.advance(CompletionState::Sending);
        let _ = call.finish::<()>(Err(AttuneError::EmptyResponse));
        assert_eq!(call.state, CompletionState::Failed(ErrorKind::EmptyResponse));
        assert_eq!(call.state.to_string(), "failed(empty_response)");
    }
}
