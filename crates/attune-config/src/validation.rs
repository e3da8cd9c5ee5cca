// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{AttuneConfig, EmotionSourceKind};

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &AttuneConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let openai = &config.openai;
    if !(0.0..=2.0).contains(&openai.temperature) {
        fail(format!(
            "openai.temperature must be between 0 and 2, got {}",
            openai.temperature
        ));
    }
    if openai.max_tokens == 0 {
        fail("openai.max_tokens must be greater than 0".to_string());
    }
    for (name, value) in [
        ("presence_penalty", openai.presence_penalty),
        ("frequency_penalty", openai.frequency_penalty),
    ] {
        if let Some(v) = value
            && !(-2.0..=2.0).contains(&v)
        {
            fail(format!("openai.{name} must be between -2 and 2, got {v}"));
        }
    }
    if openai.timeout_secs == 0 {
        fail("openai.timeout_secs must be greater than 0".to_string());
    }
    if !openai.base_url.starts_with("http://") && !openai.base_url.starts_with("https://") {
        fail(format!(
            "openai.base_url `{}` must start with http:// or https://",
            openai.base_url
        ));
    }

    let emotion = &config.emotion;
    if emotion.cadence_secs == 0 {
        fail("emotion.cadence_secs must be greater than 0".to_string());
    }
    if emotion.history_capacity == 0 {
        fail("emotion.history_capacity must be greater than 0".to_string());
    }
    let (lo, hi) = (emotion.min_intensity, emotion.max_intensity);
    if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
        fail(format!(
            "emotion.min_intensity and emotion.max_intensity must satisfy 0 <= min <= max <= 1, got {lo}..{hi}"
        ));
    }
    match emotion.source {
        EmotionSourceKind::Scripted
            if emotion
                .script_path
                .as_deref()
                .is_none_or(|p| p.trim().is_empty()) =>
        {
            fail("emotion.script_path is required when emotion.source = \"scripted\"".to_string());
        }
        EmotionSourceKind::Push
            if !emotion.push_url.starts_with("ws://") && !emotion.push_url.starts_with("wss://") =>
        {
            fail(format!(
                "emotion.push_url `{}` must start with ws:// or wss://",
                emotion.push_url
            ));
        }
        _ => {}
    }
    if emotion.push_timeout_secs == 0 {
        fail("emotion.push_timeout_secs must be greater than 0".to_string());
    }
    if emotion.user_id.trim().is_empty() {
        fail("emotion.user_id must not be empty".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }
    if config
        .gateway
        .bearer_token
        .as_deref()
        .is_some_and(|t| t.trim().is_empty())
    {
        fail("gateway.bearer_token must not be blank when set".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
