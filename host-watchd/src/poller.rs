use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use shared::types::Snapshot;
use crate::config::PollConfig;
use crate::diff::{diff_snapshots, SnapshotDiff};
use crate::inventory::fingerprint::compute_fingerprint;
use crate::inventory::InventoryClient;

/// Changes found in one poll cycle, handed to the notifier
#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub previous_at: DateTime<Utc>,
    pub captured_at: DateTime<Utc>,
    pub diff: SnapshotDiff,
}

/// The most recently captured snapshot, shared read-only with the status API
#[derive(Debug, Clone)]
pub struct LatestSnapshot {
    pub snapshot: Arc<Snapshot>,
    pub fingerprint: String,
}

/// Previous snapshot plus its fingerprint, owned by the poll loop
pub struct Baseline {
    snapshot: Arc<Snapshot>,
    fingerprint: String,
}

/// Compare a freshly captured snapshot against the baseline.
///
/// Returns the report to send (if anything changed) and the new baseline.
/// The current snapshot replaces the previous one outright.
pub fn advance(previous: Option<Baseline>, current: Snapshot) -> (Option<HostReport>, Baseline) {
    let fingerprint = compute_fingerprint(&current);

    let report = match &previous {
        None => {
            tracing::info!("Initial snapshot: {} hosts ({})", current.len(), fingerprint);
            None
        }
        Some(previous) if previous.fingerprint == fingerprint => {
            tracing::debug!("Snapshot unchanged ({})", fingerprint);
            None
        }
        Some(previous) => {
            let diff = diff_snapshots(&previous.snapshot, &current);
            tracing::info!(
                "Snapshot {} -> {}: {} hosts affected ({} created, {} retired, {} changed)",
                previous.fingerprint,
                fingerprint,
                diff.len(),
                diff.created.len(),
                diff.retired.len(),
                diff.changed.len()
            );
            (!diff.is_empty()).then(|| HostReport {
                previous_at: previous.snapshot.captured_at(),
                captured_at: current.captured_at(),
                diff,
            })
        }
    };

    (report, Baseline { snapshot: Arc::new(current), fingerprint })
}

/// Poll loop - fetches a snapshot each interval and diffs it against the last one.
///
/// Cycles run strictly one after another, so each diff sees a settled pair
/// of snapshots. A failed fetch skips the cycle and keeps the old baseline.
pub async fn run(
    client: InventoryClient,
    reports: mpsc::Sender<HostReport>,
    latest: watch::Sender<Option<LatestSnapshot>>,
    config: PollConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut baseline: Option<Baseline> = None;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = tokio::select! {
                    result = client.fetch_snapshot() => result,
                    _ = cancel.cancelled() => break,
                };
                let snapshot = match snapshot {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!("Failed to fetch hosts, skipping cycle: {}", e);
                        continue;
                    }
                };

                let (report, next) = advance(baseline.take(), snapshot);
                latest.send_replace(Some(LatestSnapshot {
                    snapshot: Arc::clone(&next.snapshot),
                    fingerprint: next.fingerprint.clone(),
                }));
                baseline = Some(next);

                if let Some(report) = report {
                    if let Err(e) = reports.send(report).await {
                        tracing::error!("Notifier is gone, stopping poller: {}", e);
                        break;
                    }
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("Poller shutting down");
                break;
            }
        }
    }

    Ok(())
}
