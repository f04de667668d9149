//! Network client listing from the controller.

use netnest_sources::{Device, DeviceStatus, Inventory, StatusHub};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{self, RenderCtx};

use super::{note_absent, plain_id};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StationRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Device> for StationRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d.name.clone(),
            ip: d.address.clone(),
            mac: d.identity.clone(),
            status: status_label(d),
        }
    }
}

/// Status cell text; sources that report no liveness show "-".
pub(crate) fn status_label(device: &Device) -> String {
    match device.status {
        Some(DeviceStatus::Online) => "online".into(),
        Some(DeviceStatus::Offline) => "offline".into(),
        None => "-".into(),
    }
}

/// Station table for the combined status report.
pub(crate) fn table(inventory: &Inventory) -> String {
    let rows: Vec<StationRow> = inventory.devices.iter().map(StationRow::from).collect();
    output::render_table(&rows)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &StatusHub, ctx: &RenderCtx) -> Result<(), CliError> {
    let Some(inventory) = hub.network_clients().await else {
        note_absent("controller", ctx.quiet);
        return Ok(());
    };

    let out = output::render_list(
        &ctx.format,
        &inventory.devices,
        |d| StationRow::from(d),
        |d| plain_id(d),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}
