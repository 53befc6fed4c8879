mod cli;
mod config;
mod core;
mod error;
mod tui;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::core::{
    Assistant, OpenAiCompletionClient, Reply, Session, TextService, TranscriptService,
    YouTubeProvider,
};
use crate::error::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// The TUI owns the terminal, so its logs go here instead of stderr.
const TUI_LOG_FILE: &str = "yt-assistant.log";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));

    if let Err(err) = init_tracing(tui_mode) {
        eprintln!("Error: could not set up logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(tui_mode: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "yt_assistant=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if tui_mode {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(TUI_LOG_FILE)?;
        registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::from_env()?;
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(max_attempts) = cli.max_attempts {
        settings.max_attempts = max_attempts;
    }

    info!(
        model = %settings.model,
        proxies = settings.proxies.len(),
        max_attempts = settings.max_attempts,
        "starting"
    );
    let assistant = build_assistant(&settings);

    let reply = match cli.command {
        Some(Commands::Summarize { url, no_translate }) => {
            Session::new(assistant).summarize(&url, !no_translate).await
        }
        Some(Commands::Ask { url, question }) => {
            Session::new(assistant).ask(&url, &question).await
        }
        Some(Commands::Transcript { url }) => Session::new(assistant).transcript(&url).await,
        Some(Commands::Tui) | None => {
            tui::run(tui::App::new(assistant, status_line(&settings)))?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    print_reply(&reply, cli.json)?;
    Ok(if reply.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn build_assistant(settings: &Settings) -> Assistant {
    let transcripts = TranscriptService::new(
        Arc::new(YouTubeProvider::default()),
        settings.proxies.clone(),
    )
    .with_max_attempts(settings.max_attempts);

    let client = OpenAiCompletionClient::new(
        &settings.api_key,
        &settings.api_base,
        settings.model.clone(),
    );

    Assistant::new(transcripts, TextService::new(Arc::new(client)))
}

fn status_line(settings: &Settings) -> String {
    let route = match settings.proxies.len() {
        0 => "direct connection".to_string(),
        1 => "1 proxy".to_string(),
        n => format!("{n} proxies"),
    };
    format!("model {} · {route}", settings.model)
}

fn print_reply(reply: &Reply, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
    } else {
        println!("{reply}");
    }
    Ok(())
}
