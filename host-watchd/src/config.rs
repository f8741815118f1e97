use std::path::Path;
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::{DEFAULT_API_BASE, DEFAULT_WEB_BASE};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/host-watch/watchd.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Usually supplied through MACKEREL_APIKEY instead
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_base")]
    pub base_url: String,
    /// Only request hosts in these statuses. Empty means the service default.
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Print reports to stdout
    #[serde(default = "default_stdout")]
    pub stdout: bool,
    #[serde(default)]
    pub slack: Option<SlackConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_web_base")]
    pub web_base: String,
    /// Looked up from the inventory API when unset
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Status API is disabled unless a listen address is given
    #[serde(default)]
    pub listen: Option<String>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_interval() -> u64 {
    20
}

fn default_stdout() -> bool {
    true
}

fn default_username() -> String {
    "Mackerel Host information".to_string()
}

fn default_web_base() -> String {
    DEFAULT_WEB_BASE.to_string()
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_api_base(),
            statuses: Vec::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            stdout: default_stdout(),
            slack: None,
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            web_base: default_web_base(),
            organization: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, apply environment overrides and validate.
    ///
    /// A missing file is only tolerated at the default path, where built-in
    /// defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
            tracing::info!("No config file at {}, using defaults", path.display());
            Config::default()
        } else {
            Self::from_file(path)?
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment variables take precedence over the file
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = var("MACKEREL_APIKEY") {
            self.inventory.api_key = Some(key);
        }
        if let Some(org) = var("MACKEREL_ORG") {
            self.links.organization = Some(org);
        }
        if let Some(url) = var("SLACK_WEBHOOK_URL") {
            let channel = var("SLACK_CHANNEL");
            match self.notify.slack.as_mut() {
                Some(slack) => {
                    slack.webhook_url = url;
                    if channel.is_some() {
                        slack.channel = channel;
                    }
                }
                None => {
                    self.notify.slack = Some(SlackConfig {
                        webhook_url: url,
                        channel,
                        username: default_username(),
                        icon_url: None,
                    });
                }
            }
        }
        if let Some(secs) = var("HOST_WATCH_INTERVAL_SECS") {
            self.poll.interval_secs = secs
                .parse()
                .with_context(|| format!("HOST_WATCH_INTERVAL_SECS is not a number: {}", secs))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        match self.inventory.api_key.as_deref() {
            Some(key) if !key.is_empty() => {}
            _ => anyhow::bail!(
                "MACKEREL_APIKEY environment variable is not set (try \"export MACKEREL_APIKEY='<Your apikey>'\")"
            ),
        }
        if self.poll.interval_secs == 0 {
            anyhow::bail!("poll.interval_secs must be greater than zero");
        }
        if !self.inventory.base_url.starts_with("http") {
            anyhow::bail!("inventory.base_url must start with http or https");
        }
        if !self.links.web_base.starts_with("http") {
            anyhow::bail!("links.web_base must start with http or https");
        }
        if let Some(slack) = &self.notify.slack {
            if !slack.webhook_url.starts_with("http") {
                anyhow::bail!("notify.slack.webhook_url must start with http or https");
            }
        }
        Ok(())
    }
}
