// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `attune serve` command implementation.
//!
//! Starts SQLite storage, the chat-completions provider, the emotion sampler
//! and the HTTP gateway, then runs until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use attune_agent::{CompletionGateway, CompletionSettings, shutdown};
use attune_config::AttuneConfig;
use attune_core::{AttuneError, HealthStatus, PluginAdapter, ProviderAdapter, StorageAdapter};
use attune_emotion::{EmotionSampler, HistoryHandle, SampleRecorder, build_source};
use attune_gateway::{GatewayState, start_server};
use attune_openai::OpenAiProvider;
use attune_storage::SqliteStorage;
use tracing::{info, warn};

/// How long the sampler gets to stop after shutdown starts.
const SAMPLER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the `attune serve` command.
pub async fn run_serve(config: AttuneConfig) -> Result<(), AttuneError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting attune serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let provider = OpenAiProvider::new(&config.openai)?;
    if let Ok(HealthStatus::Unhealthy(reason)) = provider.health_check().await {
        warn!(%reason, "provider unavailable; chat requests will fail until it is configured");
    }
    let provider: Arc<dyn ProviderAdapter> = Arc::new(provider);

    let shutdown = shutdown::install_signal_handler();

    let history = HistoryHandle::new(config.emotion.history_capacity, config.emotion.vocabulary);
    let source = build_source(&config.emotion)?;
    info!(
        source = %source.name(),
        vocabulary = %config.emotion.vocabulary,
        cadence_secs = config.emotion.cadence_secs,
        "emotion source ready"
    );
    let sampler = EmotionSampler::new(source, history.clone())
        .with_recorder(SampleRecorder {
            storage: storage.clone(),
            user_id: config.emotion.user_id.clone(),
        })
        .spawn(shutdown.child_token());

    let completion = Arc::new(CompletionGateway::new(
        provider,
        CompletionSettings::from_config(&config.agent, &config.openai),
    ));

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; every /v1 request will be rejected");
    }
    let state = GatewayState::new(
        &config.gateway,
        storage.clone(),
        history,
        completion,
        shutdown.clone(),
    );

    let served = start_server(&config.gateway, state, shutdown.clone()).await;

    // Whatever ended the server, stop everything else too.
    shutdown.cancel();
    match tokio::time::timeout(SAMPLER_STOP_TIMEOUT, sampler).await {
        Ok(Ok(emitted)) => info!(emitted, "emotion sampler stopped"),
        Ok(Err(e)) => warn!(error = %e, "emotion sampler task failed"),
        Err(_) => warn!("emotion sampler did not stop in time"),
    }

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    info!("attune serve stopped");
    served
}

/// Initializes the tracing subscriber with an environment filter.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("attune={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
