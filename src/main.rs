//! Huddle CLI entry point.
//!
//! Provides `detect` for running scheduling detection over a JSON chat
//! export and `check-config` for validating a configuration file.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use huddle::config::{load_config_or_default, Config};
use huddle::service::{JsonFileSource, SchedulingService};

/// Huddle: proactive scheduling detection for chat conversations.
#[derive(Parser)]
#[command(name = "huddle", version, about)]
struct Cli {
    /// Path to huddle.toml (defaults to ~/.huddle/huddle.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Detect scheduling threads in a JSON chat export.
    Detect {
        /// Export file; its stem is used as the conversation id.
        #[arg(long)]
        input: PathBuf,

        /// Id of the user requesting suggestions.
        #[arg(long, default_value = "cli")]
        user: String,

        /// Number of most recent messages to scan.
        #[arg(long)]
        limit: Option<usize>,

        /// Pretty-print the JSON report.
        #[arg(long)]
        pretty: bool,
    },
    /// Validate the configuration and print a summary.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config_or_default(cli.config.as_deref()).context("failed to load configuration")?;
    let _logging_guard = huddle::logging::init_from_config(&config.logging)?;

    match cli.command {
        Command::Detect {
            input,
            user,
            limit,
            pretty,
        } => handle_detect(&config, input, &user, limit, pretty).await,
        Command::CheckConfig => handle_check_config(&config),
    }
}

/// Run detection over one export file and print the report to stdout.
async fn handle_detect(
    config: &Config,
    input: PathBuf,
    user: &str,
    limit: Option<usize>,
    pretty: bool,
) -> anyhow::Result<()> {
    let (source, conversation_id) = JsonFileSource::for_file(&input);
    let service = SchedulingService::from_config(Arc::new(source), config)?;

    info!(input = %input.display(), conversation_id = %conversation_id, "running detection");
    let report = service.detect(&conversation_id, user, limit).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

/// Print a short summary of the effective configuration.
fn handle_check_config(config: &Config) -> anyhow::Result<()> {
    config.detector.validate()?;
    println!(
        "config ok: {} trigger phrases, {} availability phrases, suppression radius {}, neighborhood radius {}, cache {}",
        config.detector.trigger_keywords.len(),
        config.detector.availability_keywords.len(),
        config.detector.suppression_radius,
        config.detector.neighborhood_radius,
        if config.cache.enabled {
            format!("{}s", config.cache.ttl_secs)
        } else {
            "disabled".to_owned()
        },
    );
    Ok(())
}
