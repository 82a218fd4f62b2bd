mod commands;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use amandman::log_format::TimelineLogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "amandman",
    about = "Arrival and departure manager: descent estimates and runway sequences"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Feed a file of recorded ATC client messages through the planner and
    /// print every published timeline as one JSON line
    Replay {
        /// Newline-delimited JSON messages
        #[arg(long)]
        input: PathBuf,
        /// Planner config (defaults to AMAN_CONFIG or ./planner.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Clock at the first message, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Read ATC client messages from stdin and publish timelines to stdout
    Serve {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load the config and performance data and print a summary
    CheckConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries timelines, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .event_format(TimelineLogFormat::new(std::io::stderr().is_terminal()))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay { input, config, now } => {
            commands::handle_replay(&input, config.as_deref(), now).await
        }
        Commands::Serve { config } => commands::handle_serve(config.as_deref()).await,
        Commands::CheckConfig { config } => commands::handle_check_config(config.as_deref()),
    }
}
