use std::collections::HashMap;
use std::time::Duration;
use anyhow::Context;
use chrono::Utc;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::protocol::{API_KEY_HEADER, HOSTS_PATH, ORG_PATH, ROLE_SEPARATOR, STATUS_PARAM};
use shared::types::{HostRecord, HostState, Snapshot};
use thiserror::Error;
use crate::config::InventoryConfig;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Inventory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Inventory API rejected the API key ({0})")]
    Unauthorized(StatusCode),

    #[error("Inventory API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode inventory response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct HostsResponse {
    hosts: Vec<WireHost>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireHost {
    id: String,
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    status: String,
    #[serde(default)]
    memo: String,
    /// service name -> role names
    #[serde(default)]
    roles: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OrgResponse {
    name: String,
}

impl From<WireHost> for HostRecord {
    fn from(host: WireHost) -> Self {
        let roles = host.roles.iter().flat_map(|(service, roles)| {
            roles
                .iter()
                .map(move |role| format!("{}{}{}", service, ROLE_SEPARATOR, role))
        });

        HostRecord {
            id: host.id.into(),
            name: host.name,
            display_name: host.display_name,
            memo: host.memo,
            state: HostState::new(host.status, roles),
        }
    }
}

/// Client for the host inventory API
#[derive(Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    statuses: Vec<String>,
}

impl InventoryClient {
    pub fn new(config: &InventoryConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("Inventory API key is not configured")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            statuses: config.statuses.clone(),
        })
    }

    /// Fetch every host and index it by ID.
    ///
    /// Either the whole host list decodes or an error is returned; a snapshot
    /// is never built from part of a response.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, InventoryError> {
        let query: Vec<(&str, &str)> = self
            .statuses
            .iter()
            .map(|status| (STATUS_PARAM, status.as_str()))
            .collect();

        let response: HostsResponse = self.get_json(HOSTS_PATH, &query).await?;
        let captured_at = Utc::now();

        tracing::debug!("Fetched {} hosts", response.hosts.len());
        Ok(Snapshot::from_hosts(
            captured_at,
            response.hosts.into_iter().map(HostRecord::from),
        ))
    }

    /// Name of the organization the API key belongs to
    pub async fn organization(&self) -> Result<String, InventoryError> {
        let org: OrgResponse = self.get_json(ORG_PATH, &[]).await?;
        Ok(org.name)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, InventoryError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(InventoryError::Unauthorized(status));
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(InventoryError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
