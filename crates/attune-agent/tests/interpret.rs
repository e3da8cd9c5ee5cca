// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion interpretation against provider doubles.

use std::sync::Arc;

use attune_agent::interpret::{INTERPRETATION_MAX_TOKENS, INTERPRETER_PERSONA};
use attune_core::{AttuneError, EmotionLabel, EmotionSample, ErrorKind};
use attune_test_utils::{SpyProvider, TestHarness};

const SECTIONED: &str = "MESSAGE: It makes sense to feel uneasy.\n\
EXPLANATION: Anxiety is your body preparing for something it sees as a threat.\n\
SUGGESTION: Try breathing in for four counts and out for six.";

#[tokio::test]
async fn sectioned_reply_becomes_an_interpretation() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![SECTIONED.into()])
        .build()
        .await
        .unwrap();
    let sample = EmotionSample::new(EmotionLabel::Anxious, 0.65).unwrap();

    let interpretation = harness.interpreter().interpret(&sample).await.unwrap();
    assert_eq!(interpretation.message, "It makes sense to feel uneasy.");
    assert!(interpretation.suggestion.starts_with("Try breathing"));

    let requests = harness.mock_provider.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, INTERPRETATION_MAX_TOKENS);
    assert_eq!(requests[0].messages[0].content, INTERPRETER_PERSONA);
    assert!(requests[0].messages[1].content.contains("feeling anxious with an intensity level of 65/100"));
}

#[tokio::test]
async fn unsectioned_reply_is_malformed() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["You seem anxious. Breathe.".into()])
        .build()
        .await
        .unwrap();
    let sample = EmotionSample::new(EmotionLabel::Sad, 0.3).unwrap();
    let err = harness.interpreter().interpret(&sample).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn missing_credential_fails_before_the_network() {
    let spy = Arc::new(SpyProvider::unconfigured());
    let harness = TestHarness::builder()
        .with_provider(spy.clone())
        .build()
        .await
        .unwrap();
    let sample = EmotionSample::new(EmotionLabel::Happy, 0.9).unwrap();
    let err = harness.interpreter().interpret(&sample).await.unwrap_err();
    assert!(matches!(err, AttuneError::Config(_)));
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn foreign_label_is_rejected_without_a_call() {
    let harness = TestHarness::builder().build().await.unwrap();
    let sample = EmotionSample::new(EmotionLabel::Focused, 0.5).unwrap();
    let err = harness.interpreter().interpret(&sample).await.unwrap_err();
    assert!(matches!(err, AttuneError::Validation(_)));
    assert_eq!(harness.mock_provider.call_count().await, 0);
}
