//! Legal research chat server.
//!
//! Serves the chat screens by default; `--ask` answers one prompt in the
//! terminal instead.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use legal_research_chat::cli;
use legal_research_chat::config::{AppConfig, Cli};
use legal_research_chat::server;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env (if present)
    let _ = dotenv();

    let args = Cli::parse();

    // Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr so `--ask`
    // output stays clean.
    let default_level = if args.ask.is_some() { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match AppConfig::from_cli(&args) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &args.ask {
        Some(prompt) => cli::run_ask(&config, &args, prompt).await,
        None => server::start_server(config).await.map(|()| ExitCode::SUCCESS),
    };

    result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        ExitCode::FAILURE
    })
}
