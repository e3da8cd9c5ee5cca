// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use attune_agent::{ChatPipeline, CompletionGateway, ConversationSession, PromptComposer};
use attune_config::GatewayConfig;
use attune_core::{AttuneError, SessionId, StorageAdapter};
use attune_emotion::HistoryHandle;
use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// One conversation's pipeline, locked for the duration of a submission.
pub type SharedPipeline = Arc<Mutex<ChatPipeline>>;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Live pipelines by session id.
    pub sessions: Arc<DashMap<String, SharedPipeline>>,
    pub storage: Arc<dyn StorageAdapter>,
    /// Read-only here; the sampler task is the only writer.
    pub history: HistoryHandle,
    pub completion: Arc<CompletionGateway>,
    pub composer: PromptComposer,
    pub auth: AuthConfig,
    pub start_time: Instant,
    /// Upper bound on one `/v1/chat` request.
    pub request_timeout: Duration,
    /// Parent of every submission's cancellation token.
    pub shutdown: CancellationToken,
}

impl GatewayState {
    pub fn new(
        config: &GatewayConfig,
        storage: Arc<dyn StorageAdapter>,
        history: HistoryHandle,
        completion: Arc<CompletionGateway>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            storage,
            composer: PromptComposer::new(history.vocabulary()),
            history,
            completion,
            auth: AuthConfig {
                bearer_token: config.bearer_token.clone(),
            },
            start_time: Instant::now(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            shutdown,
        }
    }

    /// The pipeline for `id`, restoring it from the store on first use.
    pub async fn pipeline(&self, id: &str) -> SharedPipeline {
        if let Some(existing) = self.sessions.get(id) {
            return existing.clone();
        }
        let mut session = ConversationSession::new(
            SessionId(id.to_string()),
            self.history.clone(),
            self.storage.clone(),
        );
        session.restore().await;
        let pipeline = ChatPipeline::new(session, self.composer, self.completion.clone());
        // A concurrent first request may have won the race; keep its pipeline.
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(pipeline)))
            .clone()
    }

    /// Drops the live pipeline for `id` unless another request holds it.
    ///
    /// The next request for `id` restores it from the store.
    pub fn release_idle(&self, id: &str) -> bool {
        self.sessions
            .remove_if(id, |_, pipeline| Arc::strong_count(pipeline) == 1)
            .is_some()
    }
}

/// Builds the router: `/health` open, everything under `/v1` behind auth.
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/sessions/{id}/turns", get(handlers::get_turns))
        .route("/v1/interpret", post(handlers::post_interpret))
        .route("/v1/emotion", get(handlers::get_emotion))
        .route("/v1/subjects/{id}/emotions", get(handlers::get_emotions))
        .route(
            "/v1/subjects/{id}/notes",
            post(handlers::post_note).get(handlers::get_notes),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves until `shutdown` is cancelled.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), AttuneError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AttuneError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AttuneError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
