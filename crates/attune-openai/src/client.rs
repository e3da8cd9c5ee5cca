// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat-completions API.
//!
//! One request per call. Retrying is left to whoever drives the client.

use std::time::Duration;

use attune_core::AttuneError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// HTTP client bound to one API key and base URL.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiClient {
    /// Builds a client whose every request carries `Authorization: Bearer <key>`
    /// and is bounded by `timeout`.
    pub fn new(
        api_key: &SecretString,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AttuneError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| AttuneError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AttuneError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one completion request and parses the response.
    ///
    /// Non-2xx statuses and transport failures become [`AttuneError::Service`];
    /// a 2xx body that does not parse becomes [`AttuneError::MalformedResponse`].
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AttuneError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(AttuneError::Service {
                message,
                status: Some(status.as_u16()),
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| AttuneError::MalformedResponse {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn transport_error(e: reqwest::Error) -> AttuneError {
    let message = if e.is_timeout() {
        "request to text-generation service timed out".to_string()
    } else {
        format!("HTTP request failed: {e}")
    };
    AttuneError::Service {
        message,
        status: e.status().map(|s| s.as_u16()),
        source: Some(Box::new(e)),
    }
}
