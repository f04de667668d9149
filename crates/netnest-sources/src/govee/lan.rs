// LAN discovery
//
// Govee's local API answers a multicast scan request with one unicast
// datagram per device. The socket lives for exactly one call: bind,
// send the scan, collect replies until the window closes, drop. The
// window is a hard deadline -- a late reply never extends it.

use std::net::{Ipv4Addr, SocketAddrV4};

use serde::Deserialize;
use serde_json::json;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{Device, DeviceStatus};

use super::GoveeClient;

/// Scan reply envelope: `{"msg":{"cmd":"scan","data":{...}}}`.
#[derive(Debug, Deserialize)]
struct ScanReply {
    msg: ScanMsg,
}

#[derive(Debug, Deserialize)]
struct ScanMsg {
    #[serde(default)]
    cmd: String,
    #[serde(default)]
    data: ScanData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScanData {
    ip: Option<String>,
    device: Option<String>,
    sku: Option<String>,
}

impl GoveeClient {
    /// Multicast one scan request and collect replies for the
    /// configured window. Malformed datagrams are skipped; a receive
    /// error ends the window early but keeps replies already parsed.
    pub(crate) async fn discover_lan(&self) -> Result<Vec<Device>> {
        let socket =
            UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.config.lan_listen_port))
                .await?;

        let scan = json!({"msg": {"cmd": "scan", "data": {"account_topic": "reserve"}}});
        let target = SocketAddrV4::new(
            self.config.lan_multicast_addr,
            self.config.lan_multicast_port,
        );
        socket.send_to(scan.to_string().as_bytes(), target).await?;
        debug!(%target, "LAN scan request sent");

        let deadline = Instant::now() + self.config.lan_timeout;
        let mut devices = Vec::new();
        let mut buf = [0u8; 1024];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, socket.recv_from(&mut buf)).await {
                // Window closed with no further replies.
                Err(_) => break,
                Ok(Err(err)) => {
                    warn!(error = %err, "LAN receive failed; keeping replies so far");
                    break;
                }
                Ok(Ok((len, peer))) => {
                    if let Some(device) = parse_scan_datagram(&buf[..len]) {
                        debug!(%peer, device = %device.name, "LAN scan reply");
                        devices.push(device);
                    }
                }
            }
        }
        Ok(devices)
    }
}

/// Decode one datagram; anything that isn't a well-formed scan reply
/// reads as `None`. A reply that answered the scan is online by
/// definition.
fn parse_scan_datagram(raw: &[u8]) -> Option<Device> {
    let reply: ScanReply = serde_json::from_slice(raw).ok()?;
    if reply.msg.cmd != "scan" {
        return None;
    }
    let data = reply.msg.data;

    let name = data
        .sku
        .clone()
        .or_else(|| data.ip.clone())
        .unwrap_or_else(|| "Govee (LAN)".to_owned());

    Some(Device {
        name,
        address: data.ip.unwrap_or_default(),
        identity: data.device.unwrap_or_default(),
        status: Some(DeviceStatus::Online),
        source: "lan".into(),
        model: data.sku.unwrap_or_default(),
        controllable: true,
        ..Device::default()
    })
}
