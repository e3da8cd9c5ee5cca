// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./attune.toml` > `~/.config/attune/attune.toml` >
//! `/etc/attune/attune.toml`, with `ATTUNE_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AttuneConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/attune/attune.toml`
/// 3. `~/.config/attune/attune.toml`
/// 4. `./attune.toml`
/// 5. `ATTUNE_*` environment variables
pub fn load_config() -> Result<AttuneConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<AttuneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AttuneConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AttuneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AttuneConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AttuneConfig::default()))
        .merge(Toml::file("/etc/attune/attune.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("attune/attune.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("attune.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `ATTUNE_OPENAI_API_KEY`
/// must become `openai.api_key`, not `openai.api.key`.
pub(crate) fn env_provider() -> Env {
    // Keys reach the mapper in their original case; figment lowercases after.
    Env::prefixed("ATTUNE_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

const SECTIONS: [&str; 5] = ["agent", "openai", "emotion", "storage", "gateway"];

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
