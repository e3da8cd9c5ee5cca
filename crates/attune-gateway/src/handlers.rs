// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use attune_agent::{EmotionInterpreter, Interpretation};
use attune_core::{Annotation, AttuneError, ConversationTurn, EmotionSample, SessionId};
use attune_emotion::EmotionStats;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Longest accepted session or subject identifier.
const MAX_ID_LEN: usize = 128;

/// Most emotion samples one request may list.
const MAX_EMOTION_LIMIT: usize = 500;

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub emotion: String,
    pub intensity: f64,
    /// Continue this session; a new one is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for POST /v1/chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct TurnsResponse {
    pub session_id: String,
    pub turns: Vec<ConversationTurn>,
}

#[derive(Debug, Deserialize)]
pub struct InterpretRequest {
    pub emotion: String,
    pub intensity: f64,
}

#[derive(Debug, Deserialize)]
pub struct EmotionLogQuery {
    #[serde(default = "default_emotion_limit")]
    pub limit: usize,
}

fn default_emotion_limit() -> usize {
    20
}

#[derive(Debug, Serialize)]
pub struct EmotionLogResponse {
    pub subject_id: String,
    pub samples: Vec<EmotionSample>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteRequest {
    pub reviewer_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct NotesQuery {
    pub reviewer_id: String,
}

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub notes: Vec<Annotation>,
}

fn check_id(what: &str, id: &str) -> Result<(), ApiError> {
    if id.trim().is_empty() || id.len() > MAX_ID_LEN {
        return Err(ApiError::validation(format!(
            "{what} must be 1 to {MAX_ID_LEN} characters"
        )));
    }
    Ok(())
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/chat
///
/// Runs one submission. Completion failures answer with the mapped error
/// status; the session still records the apology turn and its id is
/// returned in the error details.
pub async fn post_chat(
    State(state): State<GatewayState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let sample = state.composer.sample_from_parts(&body.emotion, body.intensity)?;
    if body.message.trim().is_empty() {
        return Err(ApiError::validation("message must not be empty"));
    }
    let session_id = match body.session_id {
        Some(id) => {
            check_id("session_id", &id)?;
            id
        }
        None => SessionId::generate().0,
    };

    // The owned guard is the only handle this request keeps on the pipeline.
    let Ok(mut guard) = state.pipeline(&session_id).await.try_lock_owned() else {
        return Err(ApiError::from(AttuneError::Busy).with_session(session_id));
    };

    // The submission runs on its own task so a dropped request cannot leave
    // the session half-updated; the guard cancels it instead.
    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let message = body.message;
    let registry = state.clone();
    let task_session = session_id.clone();
    let task = tokio::spawn(async move {
        let result = guard.submit_with(&message, sample, &cancel).await;
        drop(guard);
        // The store is authoritative once a submission persisted cleanly or
        // was withdrawn, so the live pipeline can go.
        let settled = match &result {
            Ok(outcome) => outcome.warnings.is_empty(),
            Err(e) => matches!(e, AttuneError::Cancelled),
        };
        if settled {
            registry.release_idle(&task_session);
        }
        result
    });

    let joined = match tokio::time::timeout(state.request_timeout, task).await {
        Ok(joined) => joined,
        Err(_) => {
            return Err(ApiError::from(AttuneError::service("request timed out"))
                .with_session(session_id));
        }
    };
    let outcome = match joined {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => return Err(ApiError::from(e).with_session(session_id)),
        Err(e) => {
            return Err(ApiError::from(AttuneError::Internal(format!(
                "submission task failed: {e}"
            )))
            .with_session(session_id));
        }
    };

    match outcome.failure {
        Some(err) => Err(ApiError::from_error(&err, outcome.correlation_id).with_session(session_id)),
        None => Ok(Json(ChatResponse {
            response: outcome.reply,
            session_id,
        })),
    }
}

/// POST /v1/interpret
pub async fn post_interpret(
    State(state): State<GatewayState>,
    body: Result<Json<InterpretRequest>, JsonRejection>,
) -> Result<Json<Interpretation>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let sample = state.composer.sample_from_parts(&body.emotion, body.intensity)?;

    let correlation_id = Uuid::new_v4();
    let interpreter = EmotionInterpreter::new(state.composer, state.completion.clone());
    let interpretation = interpreter
        .interpret(&sample)
        .await
        .map_err(|e| ApiError::from_error(&e, correlation_id))?;
    tracing::info!(%correlation_id, emotion = %sample.label(), "emotion interpreted");
    Ok(Json(interpretation))
}

/// GET /v1/sessions/{id}/turns
pub async fn get_turns(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<TurnsResponse>, ApiError> {
    check_id("session id", &id)?;
    // A live, idle session is authoritative; otherwise read the store.
    let live = state
        .sessions
        .get(&id)
        .map(|entry| entry.clone())
        .and_then(|pipeline| {
            pipeline
                .try_lock()
                .ok()
                .map(|p| p.session().turns().to_vec())
        });
    let turns = match live {
        Some(turns) => turns,
        None => state.storage.load_turns(&id).await?,
    };
    Ok(Json(TurnsResponse {
        session_id: id,
        turns,
    }))
}

/// GET /v1/emotion
pub async fn get_emotion(State(state): State<GatewayState>) -> Json<EmotionStats> {
    Json(state.history.stats())
}

/// POST /v1/subjects/{id}/notes
pub async fn post_note(
    State(state): State<GatewayState>,
    Path(subject_id): Path<String>,
    body: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Annotation>), ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    check_id("subject id", &subject_id)?;
    check_id("reviewer_id", &body.reviewer_id)?;
    if body.content.trim().is_empty() {
        return Err(ApiError::validation("note content must not be empty"));
    }

    let note = Annotation {
        id: Uuid::new_v4().to_string(),
        reviewer_id: body.reviewer_id,
        subject_id,
        content: body.content,
        created_at: chrono::Utc::now(),
    };
    state.storage.add_annotation(&note).await?;
    tracing::info!(note_id = %note.id, subject_id = %note.subject_id, "note added");
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /v1/subjects/{id}/emotions?limit=
///
/// The subject's most recent recorded samples, oldest first.
pub async fn get_emotions(
    State(state): State<GatewayState>,
    Path(subject_id): Path<String>,
    query: Result<Query<EmotionLogQuery>, QueryRejection>,
) -> Result<Json<EmotionLogResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    check_id("subject id", &subject_id)?;
    if !(1..=MAX_EMOTION_LIMIT).contains(&query.limit) {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_EMOTION_LIMIT}"
        )));
    }
    let samples = state.storage.list_emotions(&subject_id, query.limit).await?;
    Ok(Json(EmotionLogResponse {
        subject_id,
        samples,
    }))
}

/// GET /v1/subjects/{id}/notes?reviewer_id=
pub async fn get_notes(
    State(state): State<GatewayState>,
    Path(subject_id): Path<String>,
    query: Result<Query<NotesQuery>, QueryRejection>,
) -> Result<Json<NotesResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    check_id("subject id", &subject_id)?;
    check_id("reviewer_id", &query.reviewer_id)?;
    let notes = state
        .storage
        .list_annotations(&query.reviewer_id, &subject_id)
        .await?;
    Ok(Json(NotesResponse { notes }))
}
