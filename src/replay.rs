//! Feeding recorded ATC client messages through a planner.
//!
//! Input is newline-delimited JSON. Each line is either a bare message or a
//! message with the time it was received:
//!
//! ```text
//! {"type":"weather","profiles":[]}
//! {"at":"2025-06-01T12:00:05Z","message":{"type":"arrivals","inbounds":[]}}
//! ```
//!
//! Bare lines are applied at the time of the previous line. After every line
//! the planner recomputes and each snapshot is handed to the sink.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::adapter::{MessageFromAtcClient, TimelineSink};
use crate::planner::{MessageOutcome, Planner, publish_all};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Timed {
        at: DateTime<Utc>,
        message: MessageFromAtcClient,
    },
    Bare(MessageFromAtcClient),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub messages: usize,
    pub rejected: usize,
    pub snapshots: usize,
}

/// Apply every message from `input`, starting the clock at `start`
pub async fn replay<R>(
    planner: &Arc<Planner>,
    input: R,
    start: DateTime<Utc>,
    sink: &dyn TimelineSink,
) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut clock = start;
    let mut summary = ReplaySummary::default();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read replay input")? {
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parsed: ReplayLine = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid replay message at line {}", line_number))?;
        let message = match parsed {
            ReplayLine::Timed { at, message } => {
                clock = clock.max(at);
                message
            }
            ReplayLine::Bare(message) => message,
        };

        summary.messages += 1;
        match planner.handle_message(message, clock).await {
            Ok(MessageOutcome::Handled) => {}
            Ok(MessageOutcome::SlotUnavailable {
                request_id,
                callsign,
            }) => {
                summary.rejected += 1;
                info!(
                    "Line {}: no slot for {} in timeline {}",
                    line_number, callsign, request_id
                );
            }
            Err(e) => {
                summary.rejected += 1;
                warn!("Line {}: message rejected: {:#}", line_number, e);
            }
        }

        let snapshots = planner.recompute(clock);
        summary.snapshots += snapshots.len();
        publish_all(sink, snapshots).await;
    }

    info!(
        "Replayed {} messages ({} rejected), published {} snapshots",
        summary.messages, summary.rejected, summary.snapshots
    );
    Ok(summary)
}
