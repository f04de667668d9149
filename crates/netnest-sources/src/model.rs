// Normalized records shared by every source
//
// Each backend speaks its own dialect (UniFi station objects, Govee cloud
// records, Tailscale status JSON, LAN scan datagrams). Sources map those
// into the one `Device` schema here so the hub and CLI never see raw
// backend payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Device ───────────────────────────────────────────────────────────

/// Online/offline state of a device, where a source can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

/// One device as seen by a source, in the common schema.
///
/// `identity` is the stable hardware identifier (MAC, Govee device ID)
/// and drives deduplication: when non-empty it is unique within one
/// [`Inventory`]; empty identities are never deduplicated against each
/// other. `status` is `None` where the backend reports no liveness at
/// all (Govee cloud records).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    /// Network address, empty when the source reports none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    /// Stable hardware identifier, empty when the source reports none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    /// Which channel produced the record ("controller", "cloud", "lan", ...).
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub controllable: bool,
    /// Commands the backend advertises for this device, verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl Device {
    /// True if the device is currently reported online.
    pub fn is_online(&self) -> bool {
        self.status == Some(DeviceStatus::Online)
    }
}

// ── Inventory ────────────────────────────────────────────────────────

/// An ordered device list captured at one instant. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub total: usize,
    pub devices: Vec<Device>,
    pub fetched_at: DateTime<Utc>,
}

impl Inventory {
    /// Build an inventory stamped with the current time.
    pub fn now(devices: Vec<Device>) -> Self {
        Self {
            total: devices.len(),
            devices,
            fetched_at: Utc::now(),
        }
    }
}

// ── Control ──────────────────────────────────────────────────────────

/// A normalized control request, constructed per call and not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Target device identity (Govee device ID).
    pub device: String,
    /// Target device model (SKU).
    pub model: String,
    /// Command name; `"turn"` is the power-switch family.
    pub name: String,
    /// Command value, scalar or small struct ("on", "off", a brightness int).
    #[serde(default)]
    pub value: serde_json::Value,
}

impl ControlCommand {
    /// Power command for the given device.
    pub fn turn(device: impl Into<String>, model: impl Into<String>, on: bool) -> Self {
        Self {
            device: device.into(),
            model: model.into(),
            name: "turn".into(),
            value: serde_json::Value::String(if on { "on".into() } else { "off".into() }),
        }
    }
}

/// Outcome of a dispatched control command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum ControlOutcome {
    Success,
    Failure { message: String },
}

impl ControlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// The failure message, `None` on success.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { message } => Some(message),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn inventory_counts_devices() {
        let inv = Inventory::now(vec![
            Device {
                name: "lamp".into(),
                source: "cloud".into(),
                ..Device::default()
            },
            Device {
                name: "plug".into(),
                source: "lan".into(),
                ..Device::default()
            },
        ]);
        assert_eq!(inv.total, 2);
        assert_eq!(inv.devices.len(), 2);
    }

    #[test]
    fn turn_maps_boolean_to_wire_value() {
        let on = ControlCommand::turn("AA:BB", "H6159", true);
        assert_eq!(on.name, "turn");
        assert_eq!(on.value, serde_json::json!("on"));
        let off = ControlCommand::turn("AA:BB", "H6159", false);
        assert_eq!(off.value, serde_json::json!("off"));
    }

    #[test]
    fn device_serialization_omits_empty_fields() {
        let dev = Device {
            name: "printer".into(),
            source: "controller".into(),
            status: Some(DeviceStatus::Offline),
            ..Device::default()
        };
        let json = serde_json::to_value(&dev).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "printer",
                "source": "controller",
                "status": "offline",
            })
        );
    }
}
