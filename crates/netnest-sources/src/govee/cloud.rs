// Cloud discovery
//
// Three endpoints share one envelope routine: a `code` of 200 (number
// or string) gates extraction, and the device array is accepted at any
// of the shapes the API has shipped over the years -- `data.devices`,
// `data.deviceList`, `data` itself, or a top-level `devices`.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::model::Device;

use super::{GoveeClient, is_success_code, text};

impl GoveeClient {
    /// Fetch cloud devices: openapi first, then the two legacy
    /// endpoints whenever the primary yields nothing. Never fails;
    /// every problem reads as an empty contribution.
    pub(crate) async fn fetch_cloud(&self) -> Vec<Device> {
        let primary = format!("{}/router/api/v1/user/devices", self.config.openapi_base);
        let mut found = self.fetch_channel(&primary, "cloud").await;

        if found.is_empty() {
            let lights = format!("{}/v1/devices", self.config.legacy_base);
            let appliances = format!("{}/v1/appliance/devices", self.config.legacy_base);
            found = self.fetch_channel(&lights, "light").await;
            found.extend(self.fetch_channel(&appliances, "appliance").await);
        }
        found
    }

    async fn fetch_channel(&self, url: &str, tag: &str) -> Vec<Device> {
        match self.try_fetch_channel(url, tag).await {
            Ok(devices) => devices,
            Err(err) => {
                debug!(error = %err, url, channel = tag, "cloud channel yielded nothing");
                Vec::new()
            }
        }
    }

    async fn try_fetch_channel(&self, url: &str, tag: &str) -> Result<Vec<Device>> {
        let url = Url::parse(url)?;
        debug!(%url, channel = tag, "GET device list");

        let body: Value = self.http.get(url).send().await?.json().await?;
        if !body.get("code").is_some_and(is_success_code) {
            debug!(channel = tag, "device list response without success code");
            return Ok(Vec::new());
        }

        let Some(records) = extract_records(&body) else {
            debug!(channel = tag, "device list response without device array");
            return Ok(Vec::new());
        };

        Ok(records
            .iter()
            .filter_map(|record| record_to_device(record, tag))
            .collect())
    }
}

/// Locate the device array in any of the accepted response shapes.
fn extract_records(body: &Value) -> Option<&Vec<Value>> {
    let data = body.get("data");
    let records = match data {
        Some(Value::Object(map)) => map.get("devices").or_else(|| map.get("deviceList")),
        Some(Value::Array(_)) => data,
        _ => None,
    };
    records.or_else(|| body.get("devices")).and_then(Value::as_array)
}

/// Map one raw record into the common schema. Non-object records are
/// skipped. Name preference: `deviceName`, then `model`, then an
/// em-dash placeholder; an empty string present in the payload is kept.
fn record_to_device(record: &Value, tag: &str) -> Option<Device> {
    let map = record.as_object()?;

    let identity = map
        .get("device")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let model = map
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let name = map
        .get("deviceName")
        .and_then(Value::as_str)
        .or_else(|| map.get("model").and_then(Value::as_str))
        .unwrap_or("\u{2014}")
        .to_owned();
    let commands = map
        .get("supportCmds")
        .and_then(Value::as_array)
        .map(|list| list.iter().map(text).collect())
        .unwrap_or_default();
    let controllable = is_controllable(map, tag);

    Some(Device {
        name,
        identity,
        source: tag.to_owned(),
        model,
        controllable,
        commands,
        ..Device::default()
    })
}

/// A record is controllable when it says so, when it advertises any
/// command or capability, or -- on the openapi channel -- when it
/// carries both identity and model, which is all a control call needs.
fn is_controllable(map: &serde_json::Map<String, Value>, tag: &str) -> bool {
    match map.get("controllable") {
        Some(Value::Bool(flag)) => {
            if *flag {
                return true;
            }
        }
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => return true,
        _ => {}
    }
    if map
        .get("supportCmds")
        .and_then(Value::as_array)
        .is_some_and(|list| !list.is_empty())
    {
        return true;
    }
    match map.get("capabilities") {
        Some(Value::Array(list)) if !list.is_empty() => return true,
        Some(Value::Object(object)) if !object.is_empty() => return true,
        _ => {}
    }
    tag == "cloud" && has_text(map, "device") && has_text(map, "model")
}

fn has_text(map: &serde_json::Map<String, Value>, key: &str) -> bool {
    map.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_all_four_array_shapes() {
        let nested = json!({"data": {"devices": [{"device": "a"}]}});
        let listed = json!({"data": {"deviceList": [{"device": "a"}]}});
        let bare = json!({"data": [{"device": "a"}]});
        let top = json!({"devices": [{"device": "a"}]});
        for body in [&nested, &listed, &bare, &top] {
            assert_eq!(extract_records(body).map(Vec::len), Some(1));
        }
        assert_eq!(extract_records(&json!({"data": 3})), None);
        assert_eq!(extract_records(&json!({"data": {"devices": "no"}})), None);
    }

    #[test]
    fn record_name_falls_back_to_model_then_placeholder() {
        let full = record_to_device(
            &json!({"device": "AA", "model": "H6159", "deviceName": "Desk"}),
            "cloud",
        )
        .map(|d| d.name);
        assert_eq!(full.as_deref(), Some("Desk"));

        let modeled = record_to_device(&json!({"device": "AA", "model": "H6159"}), "cloud")
            .map(|d| d.name);
        assert_eq!(modeled.as_deref(), Some("H6159"));

        let bare = record_to_device(&json!({"device": "AA"}), "cloud").map(|d| d.name);
        assert_eq!(bare.as_deref(), Some("\u{2014}"));

        assert!(record_to_device(&json!("not an object"), "cloud").is_none());
    }

    #[test]
    fn controllability_accepts_flag_commands_and_capabilities() {
        let flag = json!({"controllable": true});
        let flag_text = json!({"controllable": "TRUE"});
        let flag_off = json!({"controllable": false});
        let cmds = json!({"supportCmds": ["turn"]});
        let caps = json!({"capabilities": [{"type": "on_off"}]});
        let caps_map = json!({"capabilities": {"on_off": {}}});
        let addressed = json!({"device": "AA", "model": "H6159"});
        let empty = json!({});

        let check = |v: &Value, tag: &str| is_controllable(v.as_object().unwrap(), tag);
        assert!(check(&flag, "light"));
        assert!(check(&flag_text, "light"));
        assert!(!check(&flag_off, "light"));
        assert!(check(&cmds, "light"));
        assert!(check(&caps, "light"));
        assert!(check(&caps_map, "light"));
        assert!(check(&addressed, "cloud"));
        assert!(!check(&addressed, "light"));
        assert!(!check(&empty, "cloud"));
    }

    #[test]
    fn commands_are_copied_verbatim() {
        let device = record_to_device(
            &json!({"device": "AA", "supportCmds": ["turn", "brightness"]}),
            "light",
        )
        .unwrap();
        assert_eq!(device.commands, vec!["turn", "brightness"]);
        assert!(device.controllable);
    }
}
