//! One facade over every source.
//!
//! The hub owns one client per backend and delegates; it adds no
//! caching or policy of its own. Each accessor keeps its source's
//! sentinel shape: `None` (or a failure outcome) where a source is
//! disabled or away, so callers decide how to render absence.

use std::sync::Arc;

use serde_json::Value;

use crate::agents::{AgentClient, AgentsConfig};
use crate::error::Result;
use crate::govee::{GoveeClient, GoveeConfig};
use crate::model::{ControlCommand, ControlOutcome, Inventory};
use crate::speedtest::{SpeedProbe, SpeedSnapshot, SpeedtestConfig};
use crate::tailscale::{TailscaleCli, TailscaleConfig};
use crate::unifi::{UnifiClient, UnifiConfig};

/// Settings for every source, one section per backend.
#[derive(Debug, Clone, Default)]
pub struct HubConfig {
    pub unifi: UnifiConfig,
    pub govee: GoveeConfig,
    pub tailscale: TailscaleConfig,
    pub speedtest: SpeedtestConfig,
    pub agents: AgentsConfig,
}

/// Facade owning all source clients.
pub struct StatusHub {
    unifi: UnifiClient,
    govee: GoveeClient,
    tailscale: TailscaleCli,
    speedtest: SpeedProbe,
    agents: AgentClient,
}

impl StatusHub {
    /// Build every client up front. Construction fails only on HTTP
    /// client build errors; per-source availability is decided per call.
    pub fn new(config: HubConfig) -> Result<Self> {
        Ok(Self {
            unifi: UnifiClient::new(config.unifi)?,
            govee: GoveeClient::new(config.govee)?,
            tailscale: TailscaleCli::new(config.tailscale),
            speedtest: SpeedProbe::new(config.speedtest),
            agents: AgentClient::new(config.agents)?,
        })
    }

    /// Stations known to the network controller.
    pub async fn network_clients(&self) -> Option<Inventory> {
        self.unifi.fetch_clients().await
    }

    /// Smart devices from the Govee cloud and LAN channels.
    pub async fn smart_devices(&self) -> Option<Inventory> {
        self.govee.fetch_devices().await
    }

    /// Dispatch a control command to a smart device.
    pub async fn control_device(&self, command: &ControlCommand) -> ControlOutcome {
        self.govee.control(command).await
    }

    /// Mesh-VPN nodes.
    pub async fn vpn_status(&self) -> Option<Inventory> {
        self.tailscale.fetch_status().await
    }

    /// Bandwidth measurement, possibly served from cache.
    pub async fn bandwidth(&self) -> Option<Arc<SpeedSnapshot>> {
        self.speedtest.get_result().await
    }

    /// Raw stats from the server agent.
    pub async fn server_agent(&self) -> Option<Value> {
        self.agents.server_stats().await
    }

    /// Raw stats from the desktop agent.
    pub async fn desktop_agent(&self) -> Option<Value> {
        self.agents.desktop_stats().await
    }
}
