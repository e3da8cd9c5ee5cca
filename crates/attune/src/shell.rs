// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `attune shell` command implementation.
//!
//! An interactive REPL over one conversation session. The emotion sampler
//! runs in the background and each reply shows the emotion it was composed
//! with.

use std::sync::Arc;

use attune_agent::{
    ChatPipeline, CompletionGateway, CompletionSettings, ConversationSession, PromptComposer,
    SubmitOutcome, intensity_percent,
};
use attune_config::AttuneConfig;
use attune_core::{AttuneError, EmotionSample, ProviderAdapter, SessionId, StorageAdapter};
use attune_emotion::{EmotionSampler, HistoryHandle, build_source};
use attune_openai::OpenAiProvider;
use attune_storage::SqliteStorage;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;

/// Runs the `attune shell` interactive REPL.
pub async fn run_shell(config: AttuneConfig, resume: Option<String>) -> Result<(), AttuneError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    let provider = OpenAiProvider::new(&config.openai)?;
    if let Err(e) = provider.ensure_configured() {
        eprintln!("{}: {e}", "warning".yellow());
    }
    let provider: Arc<dyn ProviderAdapter> = Arc::new(provider);

    let history = HistoryHandle::new(config.emotion.history_capacity, config.emotion.vocabulary);
    let stop = CancellationToken::new();
    let sampler = EmotionSampler::new(build_source(&config.emotion)?, history.clone())
        .spawn(stop.child_token());

    let session_id = resume.map(SessionId).unwrap_or_else(SessionId::generate);
    let mut session = ConversationSession::new(session_id.clone(), history.clone(), storage.clone());
    let restored = session.restore().await;
    for warning in session.drain_warnings() {
        eprintln!("{}: {warning}", "warning".yellow());
    }
    let mut pipeline = ChatPipeline::new(
        session,
        PromptComposer::new(config.emotion.vocabulary),
        Arc::new(CompletionGateway::new(
            provider,
            CompletionSettings::from_config(&config.agent, &config.openai),
        )),
    );

    let mut rl = DefaultEditor::new()
        .map_err(|e| AttuneError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "attune shell".bold().green());
    println!("{}", format!("session {session_id}").dimmed());
    if restored > 0 {
        println!("{}", format!("restored {restored} turns").dimmed());
    }
    println!(
        "Type {} to exit, {} for the emotion summary.\n",
        "/quit".yellow(),
        "/emotion".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "/quit" | "/exit" => break,
                    "" => continue,
                    "/emotion" => {
                        print_emotion_summary(&history);
                        continue;
                    }
                    _ => {}
                }
                let _ = rl.add_history_entry(&line);

                match pipeline.submit(trimmed, &stop.child_token()).await {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    stop.cancel();
    let _ = sampler.await;
    storage.close().await?;
    println!("{}", "goodbye".dimmed());
    Ok(())
}

fn emotion_tag(sample: &EmotionSample) -> String {
    let percent = intensity_percent(sample.intensity()).unwrap_or_default();
    format!("[{} {percent}%]", sample.label())
}

fn print_outcome(outcome: &SubmitOutcome) {
    let tag = emotion_tag(&outcome.emotion).cyan();
    match &outcome.failure {
        None => println!("{} {tag} {}\n", "attune>".blue(), outcome.reply),
        Some(err) => {
            println!("{} {tag} {}", "attune>".blue(), outcome.reply.yellow());
            eprintln!("{}\n", format!("({}: {err})", err.kind()).dimmed());
        }
    }
    for warning in &outcome.warnings {
        eprintln!("{}: {warning}", "warning".yellow());
    }
}

fn print_emotion_summary(history: &HistoryHandle) {
    let stats = history.stats();
    let latest = stats
        .latest
        .as_ref()
        .map(emotion_tag)
        .unwrap_or_else(|| "none yet".to_string());
    println!(
        "{}",
        format!(
            "latest {latest}, average intensity {:.2}, most frequent {}, {} samples",
            stats.average_intensity, stats.dominant_label, stats.samples
        )
        .dimmed()
    );
}
