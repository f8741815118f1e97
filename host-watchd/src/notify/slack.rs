use std::time::Duration;
use anyhow::{Context, Result};
use serde::Serialize;
use crate::config::SlackConfig;
use crate::notify::render::{render_sections, summary, Links, Markup};
use crate::poller::HostReport;

#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<&'a str>,
    pub username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<&'a str>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
pub struct Attachment {
    pub title: String,
    pub color: &'static str,
    pub text: String,
    pub mrkdwn_in: [&'static str; 1],
}

/// Posts reports to a Slack incoming webhook
pub struct SlackNotifier {
    http: reqwest::Client,
    config: SlackConfig,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn payload(&self, report: &HostReport, links: &Links) -> Payload<'_> {
        let attachments = render_sections(&report.diff, links, Markup::Slack)
            .into_iter()
            .map(|section| Attachment {
                text: section.body(),
                title: section.title,
                color: section.color,
                mrkdwn_in: ["text"],
            })
            .collect();

        Payload {
            text: format!(
                "Host changes since {}: {}",
                report.previous_at.format("%Y-%m-%d %H:%M:%S UTC"),
                summary(&report.diff)
            ),
            channel: self.config.channel.as_deref(),
            username: &self.config.username,
            icon_url: self.config.icon_url.as_deref(),
            attachments,
        }
    }

    pub async fn post(&self, report: &HostReport, links: &Links) -> Result<()> {
        let response = self
            .http
            .post(&self.config.webhook_url)
            .json(&self.payload(report, links))
            .send()
            .await
            .context("Failed to reach Slack webhook")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Slack webhook returned {}: {}", status, body);
        }
        Ok(())
    }
}
