// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the attune configuration system.

use attune_config::diagnostic::ConfigError;
use attune_config::model::{AttuneConfig, EmotionSourceKind};
use attune_config::{load_and_validate_str, load_config_from_str};
use attune_core::EmotionVocabulary;

#[test]
fn valid_toml_deserializes_into_attune_config() {
    let toml = r#"
[agent]
name = "companion"
log_level = "debug"
system_prompt = "Be kind."

[openai]
api_key = "sk-test"
model = "gpt-4o-mini"
temperature = 1.2
max_tokens = 120
timeout_secs = 10

[emotion]
vocabulary = "eeg"
source = "scripted"
script_path = "recording.json"
script_loop = true
cadence_secs = 2

[storage]
database_path = "/tmp/attune-test.db"
wal_mode = false

[gateway]
host = "0.0.0.0"
port = 8088
bearer_token = "secret"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "companion");
    assert_eq!(config.agent.system_prompt.as_deref(), Some("Be kind."));
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert_eq!(config.openai.max_tokens, 120);
    assert_eq!(config.emotion.vocabulary, EmotionVocabulary::Eeg);
    assert_eq!(config.emotion.source, EmotionSourceKind::Scripted);
    assert!(config.emotion.script_loop);
    assert_eq!(config.emotion.cadence_secs, 2);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.port, 8088);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("secret"));
}

#[test]
fn empty_toml_uses_reference_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "attune");
    assert_eq!(config.openai.model, "gpt-4-turbo-preview");
    assert!((config.openai.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.openai.max_tokens, 200);
    assert_eq!(config.openai.presence_penalty, Some(0.6));
    assert_eq!(config.openai.frequency_penalty, Some(0.3));
    assert_eq!(config.emotion.vocabulary, EmotionVocabulary::Affect);
    assert_eq!(config.emotion.source, EmotionSourceKind::Random);
    assert_eq!(config.emotion.cadence_secs, 5);
    assert_eq!(config.emotion.history_capacity, 20);
    assert_eq!(config.emotion.min_intensity, 0.4);
    assert_eq!(config.emotion.push_url, "ws://localhost:8765");
    assert!(!config.emotion.script_loop);
    assert!(config.storage.wal_mode);
    assert!(config.gateway.bearer_token.is_none());
}

#[test]
fn unknown_field_in_openai_produces_error() {
    let toml = r#"
[openai]
tempreature = 0.3
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("tempreature"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_vocabulary_is_rejected() {
    let toml = r#"
[emotion]
vocabulary = "plutchik"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telegram]
bot_token = "x"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn dotted_override_sets_nested_key() {
    use figment::{Figment, providers::Serialized};

    let config: AttuneConfig = Figment::new()
        .merge(Serialized::defaults(AttuneConfig::default()))
        .merge(("openai.api_key", "sk-from-env"))
        .extract()
        .expect("should set api_key via dot notation");

    assert_eq!(config.openai.api_key.as_deref(), Some("sk-from-env"));
}

#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[emotion]
cadense_secs = 3
"#;
    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "cadense_secs"
                && suggestion.as_deref() == Some("cadence_secs")
                && valid_keys.contains("history_capacity")
        })
    });
    assert!(found, "got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[openai]
max_tokens = "lots"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("max_tokens"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_errors_surface_through_load_and_validate() {
    let toml = r#"
[openai]
temperature = 3.0

[emotion]
source = "push"
push_url = "http://nope"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "modle".to_string(),
        suggestion: Some("model".to_string()),
        valid_keys: "model, temperature".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `model`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("modle"));
}
