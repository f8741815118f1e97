mod api;
mod config;
mod diff;
mod inventory;
mod notify;
mod poller;

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::inventory::InventoryClient;
use crate::notify::render::Links;
use crate::notify::slack::SlackNotifier;
use crate::notify::Sink;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("host_watchd=info"))
        )
        .init();

    tracing::info!("Starting host-watchd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    let client = InventoryClient::new(&config.inventory)?;

    // Deep links need the organization name; ask the API when it isn't configured
    let organization = match config.links.organization.clone() {
        Some(org) => Some(org),
        None => match client.organization().await {
            Ok(org) => {
                tracing::info!("Reporting for organization {}", org);
                Some(org)
            }
            Err(e) => {
                tracing::warn!("Could not look up organization, reports will not be linked: {}", e);
                None
            }
        },
    };
    let links = Links::new(config.links.web_base.clone(), organization);

    let mut sinks = Vec::new();
    if config.notify.stdout {
        sinks.push(Sink::Stdout);
    }
    if let Some(slack) = config.notify.slack.clone() {
        let timeout = Duration::from_secs(config.inventory.timeout_secs);
        sinks.push(Sink::Slack(SlackNotifier::new(slack, timeout)?));
    }
    if sinks.is_empty() {
        tracing::warn!("No notification sinks configured, changes will only be logged");
    }

    let cancel = CancellationToken::new();
    let (report_tx, report_rx) = mpsc::channel(16);
    let (latest_tx, latest_rx) = watch::channel(None);

    // Spawn poller task
    let poll_cancel = cancel.clone();
    let poll_config = config.poll.clone();
    let poller_handle = tokio::spawn(async move {
        if let Err(e) = poller::run(client, report_tx, latest_tx, poll_config, poll_cancel).await {
            tracing::error!("Poller error: {}", e);
        }
    });

    // Spawn notifier task
    let notify_cancel = cancel.clone();
    let notifier_handle = tokio::spawn(async move {
        if let Err(e) = notify::run(sinks, links, report_rx, notify_cancel).await {
            tracing::error!("Notifier error: {}", e);
        }
    });

    // Status API is optional
    let server_handle = match config.api.listen.as_deref() {
        Some(listen) => {
            let listener = tokio::net::TcpListener::bind(listen)
                .await
                .with_context(|| format!("Failed to bind to {}", listen))?;
            tracing::info!("API listening on {}", listen);

            let app = api::routes::router(api::routes::AppState { latest: latest_rx });
            let server_cancel = cancel.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(async move { server_cancel.cancelled().await })
                    .await
                {
                    tracing::error!("Server error: {}", e);
                }
            }))
        }
        None => None,
    };

    tracing::info!("Polling every {}s", config.poll.interval_secs);

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");
    cancel.cancel();

    let _ = tokio::join!(poller_handle, notifier_handle);
    if let Some(handle) = server_handle {
        let _ = handle.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
