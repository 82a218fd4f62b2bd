use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

use amandman::replay::replay;
use amandman::{JsonLinesSink, Planner};

use super::load_setup;

pub async fn handle_replay(
    input: &Path,
    config: Option<&Path>,
    now: Option<DateTime<Utc>>,
) -> Result<()> {
    let (config, performance) = load_setup(config)?;
    let planner = Arc::new(Planner::new(&config, performance));

    let file = tokio::fs::File::open(input)
        .await
        .with_context(|| format!("Failed to open replay input {:?}", input))?;
    let start = now.unwrap_or_else(Utc::now);
    info!("Replaying {:?} starting at {}", input, start);

    let sink = JsonLinesSink::new(tokio::io::stdout());
    let summary = replay(&planner, BufReader::new(file), start, &sink).await?;

    info!(
        "Replay finished: {} messages, {} snapshots",
        summary.messages, summary.snapshots
    );
    Ok(())
}
