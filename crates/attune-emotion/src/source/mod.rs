// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interchangeable emotion sources.

pub mod push;
pub mod random;
pub mod scripted;

use std::time::Duration;

use attune_config::{EmotionConfig, EmotionSourceKind};
use attune_core::{AttuneError, EmotionSource};

pub use push::PushSource;
pub use random::RandomSource;
pub use scripted::ScriptedSource;

/// Builds the source selected by `emotion.source`.
pub fn build_source(config: &EmotionConfig) -> Result<Box<dyn EmotionSource>, AttuneError> {
    let cadence = Duration::from_secs(config.cadence_secs);
    Ok(match config.source {
        EmotionSourceKind::Random => Box::new(RandomSource::new(
            config.vocabulary,
            config.min_intensity..=config.max_intensity,
            cadence,
        )?),
        EmotionSourceKind::Scripted => {
            let path = config.script_path.as_deref().ok_or_else(|| {
                AttuneError::Config("emotion.script_path is required for the scripted source".into())
            })?;
            Box::new(ScriptedSource::load(path, config.vocabulary, cadence)?.looping(config.script_loop))
        }
        EmotionSourceKind::Push => Box::new(PushSource::new(
            config.push_url.clone(),
            config.vocabulary,
            Duration::from_secs(config.push_timeout_secs),
            Duration::from_secs(config.reconnect_delay_secs),
        )),
    })
}

/// Ticker whose first tick completes immediately.
pub(crate) fn cadence_interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_each_kind() {
        let config = EmotionConfig::default();
        assert_eq!(build_source(&config).unwrap().name(), "random");

        let push = EmotionConfig {
            source: EmotionSourceKind::Push,
            ..EmotionConfig::default()
        };
        assert_eq!(build_source(&push).unwrap().name(), "push");
    }

    #[tokio::test]
    async fn scripted_without_path_is_a_config_error() {
        let config = EmotionConfig {
            source: EmotionSourceKind::Scripted,
            ..EmotionConfig::default()
        };
        assert!(matches!(
            build_source(&config).err(),
            Some(AttuneError::Config(_))
        ));
    }
}
