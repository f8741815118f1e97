pub mod render;
pub mod slack;

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::poller::HostReport;
use self::render::{render_text, Links};
use self::slack::SlackNotifier;

/// Somewhere a report gets delivered
pub enum Sink {
    Stdout,
    Slack(SlackNotifier),
}

impl Sink {
    pub fn name(&self) -> &'static str {
        match self {
            Sink::Stdout => "stdout",
            Sink::Slack(_) => "slack",
        }
    }

    pub async fn deliver(&self, report: &HostReport, links: &Links) -> Result<()> {
        match self {
            Sink::Stdout => {
                println!("{}", render_text(&report.diff, links));
                Ok(())
            }
            Sink::Slack(slack) => slack.post(report, links).await,
        }
    }
}

/// Deliver a report to every sink at once. Failures are logged, not retried.
pub async fn dispatch(sinks: &[Sink], report: &HostReport, links: &Links) -> usize {
    let results = join_all(sinks.iter().map(|sink| sink.deliver(report, links))).await;

    let mut delivered = 0;
    for (sink, result) in sinks.iter().zip(results) {
        match result {
            Ok(()) => delivered += 1,
            Err(e) => tracing::error!("Failed to deliver report to {}: {:#}", sink.name(), e),
        }
    }
    delivered
}

/// Notifier event loop - forwards poller reports to the sinks
pub async fn run(
    sinks: Vec<Sink>,
    links: Links,
    mut rx: mpsc::Receiver<HostReport>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            Some(report) = rx.recv() => {
                let delivered = dispatch(&sinks, &report, &links).await;
                tracing::debug!("Report delivered to {}/{} sinks", delivered, sinks.len());
            }
            _ = cancel.cancelled() => {
                tracing::info!("Notifier shutting down");
                break;
            }
        }
    }

    Ok(())
}
