// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use attune_core::EmotionVocabulary;
use serde::{Deserialize, Serialize};

/// Top-level attune configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttuneConfig {
    /// Companion identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Text-generation service settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Emotion sampling settings.
    #[serde(default)]
    pub emotion: EmotionConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Companion identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used by the shell and health endpoint.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Replaces the built-in persona system message when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "attune".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chat-completions service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_presence_penalty")]
    pub presence_penalty: Option<f32>,

    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: Option<f32>,

    /// Upper bound on one completion round trip.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            presence_penalty: default_presence_penalty(),
            frequency_penalty: default_frequency_penalty(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    200
}

fn default_presence_penalty() -> Option<f32> {
    Some(0.6)
}

fn default_frequency_penalty() -> Option<f32> {
    Some(0.3)
}

fn default_timeout_secs() -> u64 {
    30
}

/// Which emotion source strategy the sampler runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionSourceKind {
    #[default]
    Random,
    Scripted,
    Push,
}

/// Emotion sampling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmotionConfig {
    /// Closed label set for this deployment.
    #[serde(default)]
    pub vocabulary: EmotionVocabulary,

    #[serde(default)]
    pub source: EmotionSourceKind,

    /// Seconds between samples for the random and scripted sources.
    #[serde(default = "default_cadence_secs")]
    pub cadence_secs: u64,

    /// Number of recent samples kept for statistics.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default = "default_min_intensity")]
    pub min_intensity: f64,

    #[serde(default = "default_max_intensity")]
    pub max_intensity: f64,

    /// JSON recording played back by the scripted source.
    #[serde(default)]
    pub script_path: Option<String>,

    /// Restart the recording from the top once exhausted.
    #[serde(default)]
    pub script_loop: bool,

    #[serde(default = "default_push_url")]
    pub push_url: String,

    /// Silence on the push channel longer than this drops the connection.
    #[serde(default = "default_push_timeout_secs")]
    pub push_timeout_secs: u64,

    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Identity emitted samples are recorded under.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            vocabulary: EmotionVocabulary::default(),
            source: EmotionSourceKind::default(),
            cadence_secs: default_cadence_secs(),
            history_capacity: default_history_capacity(),
            min_intensity: default_min_intensity(),
            max_intensity: default_max_intensity(),
            script_path: None,
            script_loop: false,
            push_url: default_push_url(),
            push_timeout_secs: default_push_timeout_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            user_id: default_user_id(),
        }
    }
}

fn default_cadence_secs() -> u64 {
    5
}

fn default_history_capacity() -> usize {
    20
}

fn default_min_intensity() -> f64 {
    0.4
}

fn default_max_intensity() -> f64 {
    1.0
}

fn default_push_url() -> String {
    "ws://localhost:8765".to_string()
}

fn default_push_timeout_secs() -> u64 {
    30
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_user_id() -> String {
    "local".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("attune").join("attune.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("attune.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Token required on every `/v1` route. Unset means those routes answer 401.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Whole-request timeout applied by the HTTP layer.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    60
}
