//! Smart-device listing and control.

use netnest_sources::{ControlCommand, ControlOutcome, Device, Inventory, StatusHub};
use tabled::Tabled;

use crate::cli::{LightsArgs, LightsCommand};
use crate::error::CliError;
use crate::output::{self, RenderCtx};

use super::{note_absent, plain_id};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LightRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Control")]
    control: String,
}

impl From<&Device> for LightRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d.name.clone(),
            id: d.identity.clone(),
            model: d.model.clone(),
            source: d.source.clone(),
            control: if d.controllable { "yes" } else { "-" }.into(),
        }
    }
}

/// Smart-device table for the combined status report.
pub(crate) fn table(inventory: &Inventory) -> String {
    let rows: Vec<LightRow> = inventory.devices.iter().map(LightRow::from).collect();
    output::render_table(&rows)
}

/// CLI values pass through as JSON when they parse ("50", "true",
/// "\"on\"") and as bare strings otherwise ("on").
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &StatusHub, args: LightsArgs, ctx: &RenderCtx) -> Result<(), CliError> {
    match args.command {
        LightsCommand::List => {
            let Some(inventory) = hub.smart_devices().await else {
                note_absent("govee", ctx.quiet);
                return Ok(());
            };
            let out = output::render_list(
                &ctx.format,
                &inventory.devices,
                |d| LightRow::from(d),
                |d| plain_id(d),
            );
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        LightsCommand::Turn { device, model, on } => {
            let command = ControlCommand::turn(device, model, on);
            finish(hub.control_device(&command).await, ctx, || {
                format!("Device turned {}", if on { "on" } else { "off" })
            })
        }

        LightsCommand::Send {
            device,
            model,
            name,
            value,
        } => {
            let command = ControlCommand {
                device,
                model,
                name: name.clone(),
                value: parse_value(&value),
            };
            finish(hub.control_device(&command).await, ctx, || {
                format!("Command '{name}' sent")
            })
        }
    }
}

fn finish(
    outcome: ControlOutcome,
    ctx: &RenderCtx,
    confirmation: impl FnOnce() -> String,
) -> Result<(), CliError> {
    match outcome {
        ControlOutcome::Success => {
            if !ctx.quiet {
                eprintln!("{}", confirmation());
            }
            Ok(())
        }
        ControlOutcome::Failure { message } => Err(CliError::ControlFailed { message }),
    }
}
