//! One-shot terminal client.
//!
//! `--ask` runs a single prompt through the same engine and projection the web
//! screens use and prints the rendered assistant turn.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{AppConfig, Cli};
use crate::conversation::TurnContent;
use crate::engine::{ConversationEngine, Submission};
use crate::research::{Resource, ResearchSettings, Screen, ScreenBinding};
use crate::ui::sources::SourcesPanel;
use crate::ui::text;
use crate::ui::view::TurnView;

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for machine consumption
    Json,
}

/// JSON printed by `--ask --format json`.
#[derive(Debug, Serialize)]
pub struct AskOutput<'a> {
    pub screen: Screen,
    pub prompt: &'a str,
    pub view: TurnView,
    pub resources: &'a [Resource],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

/// Helper to create a spinner (respects quiet mode and TTY)
fn spinner(msg: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

/// Ask one question and print the answer.
///
/// Exits with failure when the request or projection failed, and with code 2
/// when the prompt was blank.
pub async fn run_ask(config: &AppConfig, cli: &Cli, prompt: &str) -> anyhow::Result<ExitCode> {
    let settings = ResearchSettings::from_config(&config.research)?;
    let binding = ScreenBinding::http(cli.screen, &settings, reqwest::Client::new())?;
    let engine = ConversationEngine::for_screen(&binding);

    let pb = spinner(&format!("Asking {}...", cli.screen.label()), cli.quiet);
    let submission = engine.submit(prompt).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let state = match submission? {
        Submission::Ignored => {
            eprintln!("Nothing to ask: the prompt is blank.");
            return Ok(ExitCode::from(2));
        }
        Submission::Settled(state) => state,
    };
    let Some(turn) = state.last_turn() else {
        anyhow::bail!("conversation settled without an assistant turn");
    };
    let error = match turn.content() {
        TurnContent::Response(content) => content.error(),
        TurnContent::Text { .. } => None,
    };
    let view = engine.render(turn);

    match cli.format {
        OutputFormat::Text => {
            print!("{}", text::turn(&view));
            let sources = text::sources(&SourcesPanel::from_state(&state));
            if !sources.is_empty() {
                print!("\n{sources}");
            }
        }
        OutputFormat::Json => {
            let output = AskOutput {
                screen: cli.screen,
                prompt: prompt.trim(),
                view,
                resources: turn.resources(),
                error,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(if error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
