// SPDX-FileCopyrightText: 2026 Attune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! attune - an emotion-aware conversational companion.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shell;

use std::path::PathBuf;

use attune_config::AttuneConfig;
use clap::{Parser, Subcommand};

/// attune - an emotion-aware conversational companion.
#[derive(Parser, Debug)]
#[command(name = "attune", version, about, long_about = None)]
struct Cli {
    /// Read this TOML file instead of the standard config locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway and the emotion sampler.
    Serve,
    /// Chat in an interactive REPL.
    Shell {
        /// Resume this session instead of starting a new one.
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => attune_config::load_and_validate_path(path),
        None => attune_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            attune_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell { session }) => shell::run_shell(config, session).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&redacted(config)) {
                Ok(rendered) => print!("{rendered}"),
                Err(e) => {
                    eprintln!("error: failed to render config: {e}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        None => {
            println!("attune: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Replaces every secret with a marker, keeping whether it was set.
fn redacted(mut config: AttuneConfig) -> AttuneConfig {
    const MARKER: &str = "[redacted]";
    if config.openai.api_key.is_some() {
        config.openai.api_key = Some(MARKER.to_string());
    }
    if config.gateway.bearer_token.is_some() {
        config.gateway.bearer_token = Some(MARKER.to_string());
    }
    config
}
