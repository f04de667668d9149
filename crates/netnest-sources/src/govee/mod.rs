//! Govee source: cloud + LAN device discovery and power control.
//!
//! Discovery merges two independent channels. The cloud channel walks
//! the openapi host first and falls back to the two legacy device
//! endpoints; the LAN channel multicasts a scan request and collects
//! replies for a bounded window. Control dispatches the capability
//! protocol first with a single legacy-protocol fallback.
//!
//! Every channel degrades to an empty contribution on failure; once the
//! source is enabled, discovery always produces an inventory.

mod cloud;
mod control;
mod lan;

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::header;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::model::{Device, Inventory};
use crate::transport::TransportConfig;

/// Settings for the Govee source.
#[derive(Debug, Clone)]
pub struct GoveeConfig {
    pub enabled: bool,
    /// Cloud API key; blank disables the cloud channel and control.
    pub api_key: SecretString,
    /// Openapi host root, without trailing slash.
    pub openapi_base: String,
    /// Legacy developer host root, without trailing slash.
    pub legacy_base: String,
    pub lan_discovery: bool,
    pub lan_multicast_addr: Ipv4Addr,
    pub lan_multicast_port: u16,
    /// Local port scan replies arrive on. Zero binds an ephemeral port.
    pub lan_listen_port: u16,
    /// Listening window for scan replies.
    pub lan_timeout: Duration,
    pub timeout: Duration,
}

impl Default for GoveeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: SecretString::from(String::new()),
            openapi_base: "https://openapi.api.govee.com".into(),
            legacy_base: "https://developer-api.govee.com".into(),
            lan_discovery: false,
            lan_multicast_addr: Ipv4Addr::new(239, 255, 255, 250),
            lan_multicast_port: 4001,
            lan_listen_port: 4002,
            lan_timeout: Duration::from_millis(5000),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Govee cloud and LAN APIs.
pub struct GoveeClient {
    config: GoveeConfig,
    http: reqwest::Client,
    /// Whether a usable API key was installed on the HTTP client.
    key_configured: bool,
}

impl GoveeClient {
    /// Build a client from settings. A non-blank API key is installed
    /// as the `Govee-API-Key` default header, marked sensitive; a key
    /// that cannot be a header value disables the cloud channel rather
    /// than failing construction.
    pub fn new(config: GoveeConfig) -> Result<Self> {
        let transport = TransportConfig::new(config.timeout);
        let key = config.api_key.expose_secret().trim().to_owned();

        let (http, key_configured) = if key.is_empty() {
            (transport.build_client()?, false)
        } else {
            match header::HeaderValue::from_str(&key) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    let mut headers = header::HeaderMap::new();
                    headers.insert("Govee-API-Key", value);
                    (transport.build_client_with_headers(headers)?, true)
                }
                Err(err) => {
                    warn!(error = %err, "Govee API key unusable as header; cloud channel off");
                    (transport.build_client()?, false)
                }
            }
        };

        Ok(Self {
            config,
            http,
            key_configured,
        })
    }

    /// Fetch the merged cloud + LAN inventory.
    ///
    /// Returns `None` only when the source is disabled; "enabled but
    /// empty" is a `Some` with zero devices. Cloud runs first, then
    /// LAN, and the merge drops any device whose non-empty identity
    /// was already taken.
    pub async fn fetch_devices(&self) -> Option<Inventory> {
        if !self.config.enabled {
            return None;
        }

        let mut devices = Vec::new();
        let mut seen = HashSet::new();

        if self.key_configured {
            for device in self.fetch_cloud().await {
                push_unique(&mut devices, &mut seen, device);
            }
        }
        if self.config.lan_discovery {
            match self.discover_lan().await {
                Ok(found) => {
                    for device in found {
                        push_unique(&mut devices, &mut seen, device);
                    }
                }
                Err(err) => warn!(error = %err, "LAN discovery failed"),
            }
        }

        Some(Inventory::now(devices))
    }
}

/// Append `device` unless its non-empty identity was already taken.
/// Empty identities cannot be deduplicated safely and always pass.
fn push_unique(devices: &mut Vec<Device>, seen: &mut HashSet<String>, device: Device) {
    let identity = device.identity.trim();
    if identity.is_empty() || seen.insert(identity.to_owned()) {
        devices.push(device);
    }
}

// ── Wire-shape helpers shared by discovery and control ──────────────

/// Backends report `code` as a number or a string; floats truncate.
pub(crate) fn is_success_code(code: &Value) -> bool {
    match code {
        Value::Number(n) => n.as_f64().is_some_and(|f| f as i64 == 200),
        Value::String(s) => s == "200",
        _ => false,
    }
}

/// Stringify a JSON value the way the payloads use text: strings
/// verbatim, everything else in its JSON rendering.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(identity: &str, name: &str) -> Device {
        Device {
            name: name.into(),
            identity: identity.into(),
            source: "cloud".into(),
            ..Device::default()
        }
    }

    #[test]
    fn dedup_drops_second_occurrence_of_identity() {
        let mut devices = Vec::new();
        let mut seen = HashSet::new();
        push_unique(&mut devices, &mut seen, named("AA", "cloud copy"));
        push_unique(&mut devices, &mut seen, named("BB", "other"));
        push_unique(&mut devices, &mut seen, named("AA", "lan copy"));
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "cloud copy");
        assert_eq!(devices[1].name, "BB");
    }

    #[test]
    fn dedup_keeps_every_empty_identity() {
        let mut devices = Vec::new();
        let mut seen = HashSet::new();
        push_unique(&mut devices, &mut seen, named("", "first"));
        push_unique(&mut devices, &mut seen, named("  ", "second"));
        push_unique(&mut devices, &mut seen, named("", "third"));
        assert_eq!(devices.len(), 3);
    }

    #[test]
    fn success_code_accepts_number_and_string_forms() {
        assert!(is_success_code(&json!(200)));
        assert!(is_success_code(&json!(200.9)));
        assert!(is_success_code(&json!("200")));
        assert!(!is_success_code(&json!(500)));
        assert!(!is_success_code(&json!("ok")));
        assert!(!is_success_code(&json!(null)));
    }

    #[test]
    fn text_keeps_strings_verbatim() {
        assert_eq!(text(&json!("turn")), "turn");
        assert_eq!(text(&json!(7)), "7");
        assert_eq!(text(&json!(true)), "true");
    }
}
