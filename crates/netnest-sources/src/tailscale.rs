//! Mesh-VPN status via the `tailscale` CLI.
//!
//! `tailscale status --json` reports this node under `Self` and every
//! other node in the `Peer` map. Both map into the common schema: the
//! self node defaults to online, peers default to offline.

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{Device, DeviceStatus, Inventory};
use crate::process;

/// Settings for the mesh-VPN source.
#[derive(Debug, Clone)]
pub struct TailscaleConfig {
    pub enabled: bool,
    /// Status argv; must emit the JSON status document.
    pub command: Vec<String>,
    pub timeout: Duration,
}

impl Default for TailscaleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: vec!["tailscale".into(), "status".into(), "--json".into()],
            timeout: Duration::from_secs(15),
        }
    }
}

/// Wrapper around the `tailscale` CLI.
pub struct TailscaleCli {
    config: TailscaleConfig,
}

impl TailscaleCli {
    pub fn new(config: TailscaleConfig) -> Self {
        Self { config }
    }

    /// Run the status command and normalize its node list: self first,
    /// then peers in document order. Returns `None` when the source is
    /// disabled, the command fails or times out, or the output is not
    /// a status document.
    pub async fn fetch_status(&self) -> Option<Inventory> {
        if !self.config.enabled {
            return None;
        }
        match self.try_fetch().await {
            Ok(devices) => Some(Inventory::now(devices)),
            Err(err) => {
                warn!(error = %err, "mesh-VPN status failed");
                None
            }
        }
    }

    async fn try_fetch(&self) -> Result<Vec<Device>> {
        let capture = process::run(&self.config.command, self.config.timeout).await?;
        if !capture.success() {
            return Err(Error::CommandFailed {
                code: capture.exit_code,
            });
        }
        let doc: StatusDocument = serde_json::from_str(&capture.output)?;
        Ok(normalize_status(&doc))
    }
}

// ── Status document ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatusDocument {
    #[serde(rename = "Self")]
    this_node: Option<NodeEntry>,
    #[serde(rename = "Peer", default)]
    peers: IndexMap<String, NodeEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeEntry {
    #[serde(rename = "DNSName")]
    dns_name: Option<String>,
    #[serde(rename = "HostName")]
    host_name: Option<String>,
    #[serde(rename = "Online")]
    online: Option<bool>,
    #[serde(rename = "TailscaleIPs")]
    tailscale_ips: Option<Vec<String>>,
}

fn normalize_status(doc: &StatusDocument) -> Vec<Device> {
    let mut devices = Vec::new();
    if let Some(node) = &doc.this_node {
        devices.push(node_to_device(node, true));
    }
    for peer in doc.peers.values() {
        devices.push(node_to_device(peer, false));
    }
    devices
}

/// Self prefers its DNS name; peers report only a hostname. Any name
/// that comes out empty renders as "Unknown".
fn node_to_device(node: &NodeEntry, is_self: bool) -> Device {
    let name = if is_self {
        node.dns_name
            .as_deref()
            .filter(|dns| !dns.is_empty())
            .map(str::to_owned)
            .or_else(|| node.host_name.clone())
            .unwrap_or_else(|| "This device".to_owned())
    } else {
        node.host_name.clone().unwrap_or_else(|| "Unknown".to_owned())
    };
    let name = if name.is_empty() { "Unknown".to_owned() } else { name };

    let online = node.online.unwrap_or(is_self);
    let address = node
        .tailscale_ips
        .as_ref()
        .and_then(|ips| ips.first())
        .cloned()
        .unwrap_or_default();

    Device {
        name,
        address,
        status: Some(if online {
            DeviceStatus::Online
        } else {
            DeviceStatus::Offline
        }),
        source: if is_self { "self" } else { "peer" }.into(),
        ..Device::default()
    }
}
