// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-completions provider adapter.
//!
//! Implements [`ProviderAdapter`] for any service speaking the OpenAI
//! `/chat/completions` wire format.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use attune_config::OpenAiConfig;
use attune_core::error::AttuneError;
use attune_core::traits::{PluginAdapter, ProviderAdapter};
use attune_core::types::{
    AdapterType, CompletionRequest, CompletionResponse, HealthStatus, TokenUsage,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};

/// Environment variable consulted when the config carries no key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat-completions provider.
///
/// Construction never fails on a missing key: the provider stays
/// unconfigured and every [`complete`](ProviderAdapter::complete) call fails
/// with [`AttuneError::Config`] before touching the network.
pub struct OpenAiProvider {
    client: Option<OpenAiClient>,
}

impl OpenAiProvider {
    /// Creates a provider from configuration.
    ///
    /// Key resolution: `openai.api_key`, then `OPENAI_API_KEY`, else unconfigured.
    pub fn new(config: &OpenAiConfig) -> Result<Self, AttuneError> {
        let key = resolve_api_key(config.api_key.as_deref(), std::env::var(API_KEY_ENV).ok());
        Self::with_key(config, key)
    }

    /// Creates a provider with an explicit (possibly absent) key.
    pub fn with_key(config: &OpenAiConfig, key: Option<SecretString>) -> Result<Self, AttuneError> {
        let client = match key {
            Some(key) => Some(OpenAiClient::new(
                &key,
                &config.base_url,
                Duration::from_secs(config.timeout_secs),
            )?),
            None => {
                warn!(
                    "no API key configured; set openai.api_key or {API_KEY_ENV}, completions will fail"
                );
                None
            }
        };

        info!(
            model = %config.model,
            base_url = %config.base_url,
            configured = client.is_some(),
            "chat-completions provider initialized"
        );

        Ok(Self { client })
    }

    fn configured_client(&self) -> Result<&OpenAiClient, AttuneError> {
        self.client.as_ref().ok_or_else(|| {
            AttuneError::Config(format!(
                "text-generation API key not found. Set openai.api_key in config or {API_KEY_ENV}."
            ))
        })
    }
}

/// Picks the config key when non-blank, else the environment value when non-blank.
fn resolve_api_key(config_key: Option<&str>, env_key: Option<String>) -> Option<SecretString> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Some(SecretString::from(key.to_string()));
    }
    env_key
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from)
}

fn to_wire_request(request: CompletionRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: request.model,
        messages: request
            .messages
            .into_iter()
            .map(|m| WireMessage {
                role: m.role,
                content: Some(m.content),
            })
            .collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        presence_penalty: request.presence_penalty,
        frequency_penalty: request.frequency_penalty,
    }
}

fn from_wire_response(response: ChatCompletionResponse) -> CompletionResponse {
    let first = response.choices.into_iter().next();
    CompletionResponse {
        id: response.id,
        model: response.model,
        content: first.as_ref().and_then(|c| c.message.content.clone()),
        finish_reason: first.and_then(|c| c.finish_reason),
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        }),
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, AttuneError> {
        // No test request: completions cost tokens.
        Ok(match self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Unhealthy("API key not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), AttuneError> {
        debug!("chat-completions provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    fn ensure_configured(&self) -> Result<(), AttuneError> {
        self.configured_client().map(|_| ())
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AttuneError> {
        let client = self.configured_client()?;
        let response = client.chat_completion(&to_wire_request(request)).await?;
        Ok(from_wire_response(response))
    }
}
