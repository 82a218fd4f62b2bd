use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use amandman::planner::MessageOutcome;
use amandman::{JsonLinesSink, MessageFromAtcClient, Planner, TimelineSink};

use super::load_setup;

/// Read ATC client messages from stdin and publish timelines to stdout until
/// stdin closes or Ctrl+C is pressed
pub async fn handle_serve(config: Option<&Path>) -> Result<()> {
    let (config, performance) = load_setup(config)?;
    let planner = Arc::new(Planner::new(&config, performance));
    let sink: Arc<dyn TimelineSink> = Arc::new(JsonLinesSink::new(tokio::io::stdout()));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let planner_task = tokio::spawn(Arc::clone(&planner).run(sink, shutdown_rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Received shutdown signal (Ctrl+C)");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let message = match MessageFromAtcClient::parse_line(&line) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("{:#}", e);
                        continue;
                    }
                };
                match planner.handle_message(message, Utc::now()).await {
                    Ok(MessageOutcome::Handled) => {}
                    Ok(MessageOutcome::SlotUnavailable { request_id, callsign }) => {
                        info!("No slot for {} in timeline {}", callsign, request_id);
                    }
                    Err(e) => warn!("Message rejected: {:#}", e),
                }
            }
        }
    }

    // The planner may already have stopped, in which case nobody listens
    let _ = shutdown_tx.send(());
    planner_task.await.context("Planner task failed")?;
    Ok(())
}
