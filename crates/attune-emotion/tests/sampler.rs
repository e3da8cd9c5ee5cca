// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sampler task behavior against real sources and test stores.

use std::sync::Arc;
use std::time::Duration;

use attune_core::{EmotionLabel, EmotionVocabulary, StorageAdapter};
use attune_emotion::{EmotionSampler, HistoryHandle, RandomSource, SampleRecorder, ScriptedSource};
use attune_test_utils::{FailingStorage, MemoryStorage};
use tokio_util::sync::CancellationToken;

const SCRIPT: &str = r#"{"data": [
    {"emotion": "calm", "intensity": 0.2},
    {"emotion": "stressed", "intensity": 0.8},
    {"emotion": "stressed", "intensity": 0.6}
]}"#;

fn scripted() -> ScriptedSource {
    ScriptedSource::from_json(SCRIPT, EmotionVocabulary::Eeg, Duration::from_millis(1)).unwrap()
}

#[tokio::test]
async fn scripted_playback_fills_history_and_stops() {
    let history = HistoryHandle::new(20, EmotionVocabulary::Eeg);
    let emitted = EmotionSampler::new(Box::new(scripted()), history.clone())
        .run(CancellationToken::new())
        .await;

    assert_eq!(emitted, 3);
    let stats = history.stats();
    assert_eq!(stats.samples, 3);
    assert_eq!(stats.dominant_label, "stressed");
    assert!((stats.average_intensity - (0.2 + 0.8 + 0.6) / 3.0).abs() < 1e-9);
    assert_eq!(history.latest().unwrap().intensity(), 0.6);
}

#[tokio::test]
async fn history_capacity_bounds_the_window() {
    let history = HistoryHandle::new(2, EmotionVocabulary::Eeg);
    EmotionSampler::new(Box::new(scripted()), history.clone())
        .run(CancellationToken::new())
        .await;
    let labels: Vec<_> = history.snapshot().iter().map(|s| s.label()).collect();
    assert_eq!(labels, [EmotionLabel::Stressed, EmotionLabel::Stressed]);
}

#[tokio::test]
async fn cancellation_stops_an_endless_source() {
    let history = HistoryHandle::new(20, EmotionVocabulary::Affect);
    let source =
        RandomSource::seeded(EmotionVocabulary::Affect, 0.4..=1.0, Duration::from_millis(5), 3)
            .unwrap();
    let cancel = CancellationToken::new();
    let handle = EmotionSampler::new(Box::new(source), history.clone()).spawn(cancel.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    let emitted = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("sampler should stop promptly")
        .unwrap();
    assert!(emitted >= 1);
    assert!(history.latest().is_some());
}

#[tokio::test]
async fn recorder_appends_each_sample() {
    let storage = Arc::new(MemoryStorage::new());
    let history = HistoryHandle::new(20, EmotionVocabulary::Eeg);
    EmotionSampler::new(Box::new(scripted()), history)
        .with_recorder(SampleRecorder {
            storage: storage.clone(),
            user_id: "user-1".into(),
        })
        .run(CancellationToken::new())
        .await;

    let logged = storage.list_emotions("user-1", 10).await.unwrap();
    assert_eq!(logged.len(), 3);
    assert_eq!(logged[0].label(), EmotionLabel::Calm);
}

#[tokio::test]
async fn failing_store_does_not_stop_sampling() {
    let history = HistoryHandle::new(20, EmotionVocabulary::Eeg);
    let emitted = EmotionSampler::new(Box::new(scripted()), history.clone())
        .with_recorder(SampleRecorder {
            storage: Arc::new(FailingStorage::new()),
            user_id: "user-1".into(),
        })
        .run(CancellationToken::new())
        .await;
    assert_eq!(emitted, 3);
    assert_eq!(history.snapshot().len(), 3);
}

#[tokio::test]
async fn foreign_labels_are_dropped() {
    // Affect history fed by an EEG script: only `anxious` is shared.
    let script = r#"{"data": [
        {"emotion": "calm", "intensity": 0.2},
        {"emotion": "anxious", "intensity": 0.5}
    ]}"#;
    let source =
        ScriptedSource::from_json(script, EmotionVocabulary::Eeg, Duration::from_millis(1)).unwrap();
    let history = HistoryHandle::new(20, EmotionVocabulary::Affect);
    let emitted = EmotionSampler::new(Box::new(source), history.clone())
        .run(CancellationToken::new())
        .await;
    assert_eq!(emitted, 1);
    assert_eq!(history.latest().unwrap().label(), EmotionLabel::Anxious);
}
