//! Stats clients for the in-house server and desktop agents.
//!
//! Agents expose one endpoint, `GET {base}/stats`, and their payloads
//! are passed through as raw JSON; the dashboard renders whatever keys
//! an agent ships. An unset URL or any transport failure reads as the
//! agent being away.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::transport::TransportConfig;

/// Settings for the agent clients. Empty URLs mean "not deployed".
#[derive(Debug, Clone)]
pub struct AgentsConfig {
    pub server_url: Option<String>,
    pub desktop_url: Option<String>,
    pub timeout: Duration,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            desktop_url: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Client for both agents.
pub struct AgentClient {
    config: AgentsConfig,
    http: reqwest::Client,
}

impl AgentClient {
    pub fn new(config: AgentsConfig) -> Result<Self> {
        let http = TransportConfig::new(config.timeout).build_client()?;
        Ok(Self { config, http })
    }

    /// Stats from the server agent, if deployed and reachable.
    pub async fn server_stats(&self) -> Option<Value> {
        self.stats(self.config.server_url.as_deref(), "server").await
    }

    /// Stats from the desktop agent, if deployed and reachable.
    pub async fn desktop_stats(&self) -> Option<Value> {
        self.stats(self.config.desktop_url.as_deref(), "desktop").await
    }

    async fn stats(&self, base: Option<&str>, agent: &str) -> Option<Value> {
        let base = base?.trim();
        if base.is_empty() {
            return None;
        }
        match self.try_stats(base).await {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(error = %err, agent, "agent stats unavailable");
                None
            }
        }
    }

    async fn try_stats(&self, base: &str) -> Result<Value> {
        let base = base.strip_suffix('/').unwrap_or(base);
        let url = Url::parse(&format!("{base}/stats"))?;
        debug!(%url, "GET agent stats");
        Ok(self.http.get(url).send().await?.json().await?)
    }
}
