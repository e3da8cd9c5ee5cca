// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: HTTP gateway, pipeline, SQLite store and the
//! chat-completions client against a local mock service.

use std::sync::Arc;
use std::time::Duration;

use attune_agent::{APOLOGY, CompletionGateway, CompletionSettings};
use attune_config::{AttuneConfig, GatewayConfig, StorageConfig};
use attune_core::{EmotionLabel, EmotionVocabulary, Role, StorageAdapter};
use attune_emotion::{EmotionSampler, HistoryHandle, ScriptedSource};
use attune_gateway::{GatewayState, build_router};
use attune_openai::OpenAiProvider;
use attune_storage::SqliteStorage;
use attune_test_utils::TestHarness;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "e2e-token";
const STUCK_REPLY: &str = "Take a breath. Tell me more about what's making you feel stuck?";

struct Stack {
    router: Router,
    storage: Arc<dyn StorageAdapter>,
    history: HistoryHandle,
    _dir: tempfile::TempDir,
}

/// Full production wiring with the provider pointed at `base_url`.
async fn stack(base_url: &str, api_key: Option<&str>) -> Stack {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = AttuneConfig::default();
    config.openai.base_url = base_url.to_string();
    config.storage = StorageConfig {
        database_path: dir.path().join("e2e.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };
    config.gateway = GatewayConfig {
        bearer_token: Some(TOKEN.to_string()),
        ..GatewayConfig::default()
    };

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await.unwrap();
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let provider = OpenAiProvider::with_key(
        &config.openai,
        api_key.map(|k| SecretString::from(k.to_string())),
    )
    .unwrap();
    let completion = Arc::new(CompletionGateway::new(
        Arc::new(provider),
        CompletionSettings::from_config(&config.agent, &config.openai),
    ));
    let history = HistoryHandle::new(config.emotion.history_capacity, config.emotion.vocabulary);
    let state = GatewayState::new(
        &config.gateway,
        storage.clone(),
        history.clone(),
        completion,
        CancellationToken::new(),
    );

    Stack {
        router: build_router(state),
        storage,
        history,
        _dir: dir,
    }
}

fn completion_body(text: &str) -> Value {
    json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "model": "gpt-4-turbo-preview",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 40, "completion_tokens": 18, "total_tokens": 58}
    })
}

fn chat(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn stuck_message_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(STUCK_REPLY)))
        .expect(1)
        .mount(&server)
        .await;
    let stack = stack(&server.uri(), Some("sk-test")).await;

    let (status, body) = send(
        stack.router.clone(),
        chat(json!({
            "message": "I feel stuck",
            "emotion": "anxious",
            "intensity": 0.7,
            "session_id": "e2e-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], STUCK_REPLY);

    let turns = stack.storage.load_turns("e2e-1").await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].content, "I feel stuck");
    let tag = turns[0].emotion_context.as_ref().unwrap();
    assert_eq!(tag.label(), EmotionLabel::Anxious);
    assert_eq!(tag.intensity(), 0.7);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, STUCK_REPLY);

    let received = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["model"], "gpt-4-turbo-preview");
    assert_eq!(sent["max_tokens"], 200);
    assert_eq!(sent["messages"][0]["role"], "system");
    assert!(
        sent["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("feeling anxious with an intensity of 70%")
    );
}

#[tokio::test]
async fn missing_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&server)
        .await;
    let stack = stack(&server.uri(), None).await;

    for attempt in 0..2 {
        let (status, body) = send(
            stack.router.clone(),
            chat(json!({
                "message": format!("hello {attempt}"),
                "emotion": "sad",
                "intensity": 0.3,
                "session_id": "no-key"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"]["kind"], "configuration");
    }

    // Each failed submission still answered with exactly one apology turn.
    let turns = stack.storage.load_turns("no-key").await.unwrap();
    let contents: Vec<_> = turns.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, ["hello 0", APOLOGY, "hello 1", APOLOGY]);
}

#[tokio::test]
async fn upstream_rate_limit_maps_to_503() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let stack = stack(&server.uri(), Some("sk-test")).await;

    let (status, body) = send(
        stack.router.clone(),
        chat(json!({"message": "hello", "emotion": "happy", "intensity": 0.9})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["details"]["kind"], "service");
    assert!(body["error"].as_str().unwrap().contains("Rate limit reached"));
}

#[tokio::test]
async fn empty_completion_maps_to_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("")))
        .mount(&server)
        .await;
    let stack = stack(&server.uri(), Some("sk-test")).await;

    let (status, body) = send(
        stack.router.clone(),
        chat(json!({"message": "hello", "emotion": "happy", "intensity": 0.9})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"]["kind"], "empty_response");
}

#[tokio::test]
async fn sampled_emotions_reach_the_snapshot_endpoint() {
    let server = MockServer::start().await;
    let stack = stack(&server.uri(), Some("sk-test")).await;

    let script = r#"{"data": [
        {"emotion": "happy", "intensity": 0.4, "timestamp": "2024-01-01T00:00:00Z"},
        {"emotion": "anxious", "intensity": 0.9, "timestamp": "2024-01-01T00:00:05Z"},
        {"emotion": "anxious", "intensity": 0.5, "timestamp": "2024-01-01T00:00:10Z"}
    ]}"#;
    let source =
        ScriptedSource::from_json(script, EmotionVocabulary::Affect, Duration::from_millis(1))
            .unwrap();
    let emitted = EmotionSampler::new(Box::new(source), stack.history.clone())
        .run(CancellationToken::new())
        .await;
    assert_eq!(emitted, 3);

    let req = Request::builder()
        .uri("/v1/emotion")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(stack.router.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["samples"], 3);
    assert_eq!(body["dominant_label"], "anxious");
    assert_eq!(body["latest"]["label"], "anxious");
    assert_eq!(body["latest"]["intensity"], 0.5);
}

#[tokio::test]
async fn harness_pipeline_survives_failures_and_recovers() {
    let harness = TestHarness::builder()
        .with_sqlite()
        .with_mock_responses(vec![])
        .build()
        .await
        .unwrap();
    harness
        .mock_provider
        .add_error(attune_core::AttuneError::service("upstream down"))
        .await;
    harness.mock_provider.add_response("I'm here with you.").await;

    let mut pipeline = harness.pipeline("recover").await;
    let cancel = CancellationToken::new();
    let first = pipeline.submit("hello?", &cancel).await.unwrap();
    assert_eq!(first.reply, APOLOGY);
    let second = pipeline.submit("hello again", &cancel).await.unwrap();
    assert_eq!(second.reply, "I'm here with you.");

    let stored = harness.storage.load_turns("recover").await.unwrap();
    assert_eq!(stored.len(), 4);
}
