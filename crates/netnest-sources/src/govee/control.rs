// Power-command dispatch
//
// Two protocols, one ordered fallback: the capability call on the
// openapi host runs first (power commands only), and the flat legacy
// PUT is attempted whenever the primary did not report success. At most
// one request per protocol per call, and the first acknowledged
// success ends the chain.

use serde_json::{Value, json};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::Error;
use crate::model::{ControlCommand, ControlOutcome};

use super::{GoveeClient, is_success_code, text};

/// Fallback message when neither protocol explains itself.
const GENERIC_FAILURE: &str = "Control failed (check API key and device support)";

/// One protocol attempt, ordered by how far it got.
enum Attempt {
    /// Backend acknowledged with a success code.
    Success,
    /// Backend answered, but without a success code; its message if any.
    Rejected(String),
    /// No decodable response at all.
    Failed(Error),
}

impl GoveeClient {
    /// Dispatch a control command.
    ///
    /// Power commands (`turn`) try the capability protocol first; every
    /// command falls back to the legacy protocol unless the primary
    /// already reported success. On double failure the outcome carries
    /// the first non-empty backend message, primary before legacy.
    pub async fn control(&self, command: &ControlCommand) -> ControlOutcome {
        if !self.config.enabled || !self.key_configured {
            return ControlOutcome::failure("Govee disabled or no API key");
        }
        if command.device.trim().is_empty()
            || command.model.trim().is_empty()
            || command.name.trim().is_empty()
        {
            return ControlOutcome::failure("Missing device, model, or command");
        }

        let mut message = String::new();

        if command.name == "turn" {
            match self.primary_turn(command).await {
                Attempt::Success => return ControlOutcome::Success,
                Attempt::Rejected(reason) => message = reason,
                Attempt::Failed(err) => {
                    debug!(error = %err, "primary control attempt failed");
                }
            }
        }

        match self.legacy_control(command).await {
            Attempt::Success => ControlOutcome::Success,
            Attempt::Rejected(reason) => {
                if message.is_empty() {
                    message = reason;
                }
                ControlOutcome::failure(first_or_generic(message))
            }
            Attempt::Failed(err) => {
                debug!(error = %err, "legacy control attempt failed");
                ControlOutcome::failure(first_or_generic(message))
            }
        }
    }

    /// Capability-style power call: `value` is 1 for "on" (any case),
    /// 0 otherwise.
    async fn primary_turn(&self, command: &ControlCommand) -> Attempt {
        let url = match Url::parse(&format!(
            "{}/router/api/v1/device/control",
            self.config.openapi_base
        )) {
            Ok(url) => url,
            Err(err) => return Attempt::Failed(err.into()),
        };

        let value = i32::from(text(&command.value).eq_ignore_ascii_case("on"));
        let body = json!({
            "requestId": Uuid::new_v4().to_string(),
            "payload": {
                "sku": command.model,
                "device": command.device,
                "capability": {
                    "type": "devices.capabilities.on_off",
                    "instance": "powerSwitch",
                    "value": value,
                },
            },
        });

        debug!(%url, device = %command.device, "POST capability control");
        self.send_attempt(self.http.post(url).json(&body)).await
    }

    /// Flat legacy body; an absent value defaults to "on".
    async fn legacy_control(&self, command: &ControlCommand) -> Attempt {
        let url = match Url::parse(&format!("{}/v1/devices/control", self.config.legacy_base)) {
            Ok(url) => url,
            Err(err) => return Attempt::Failed(err.into()),
        };

        let value = if command.value.is_null() {
            json!("on")
        } else {
            command.value.clone()
        };
        let body = json!({
            "device": command.device,
            "model": command.model,
            "cmd": {
                "name": command.name,
                "value": value,
            },
        });

        debug!(%url, device = %command.device, "PUT legacy control");
        self.send_attempt(self.http.put(url).json(&body)).await
    }

    async fn send_attempt(&self, request: reqwest::RequestBuilder) -> Attempt {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Attempt::Failed(err.into()),
        };
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(err) => return Attempt::Failed(err.into()),
        };
        if body.get("code").is_some_and(is_success_code) {
            Attempt::Success
        } else {
            Attempt::Rejected(response_message(&body))
        }
    }
}

/// The `message` field as text; absent or null reads as empty.
fn response_message(body: &Value) -> String {
    match body.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn first_or_generic(message: String) -> String {
    if message.trim().is_empty() {
        GENERIC_FAILURE.to_owned()
    } else {
        message
    }
}
