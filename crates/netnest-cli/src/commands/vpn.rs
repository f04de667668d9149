//! Mesh-VPN node listing.

use netnest_sources::{Device, Inventory, StatusHub};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{self, RenderCtx};

use super::{clients, note_absent};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&Device> for NodeRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d.name.clone(),
            ip: d.address.clone(),
            status: clients::status_label(d),
            role: d.source.clone(),
        }
    }
}

/// Node table for the combined status report.
pub(crate) fn table(inventory: &Inventory) -> String {
    let rows: Vec<NodeRow> = inventory.devices.iter().map(NodeRow::from).collect();
    output::render_table(&rows)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &StatusHub, ctx: &RenderCtx) -> Result<(), CliError> {
    let Some(inventory) = hub.vpn_status().await else {
        note_absent("tailscale", ctx.quiet);
        return Ok(());
    };

    let out = output::render_list(
        &ctx.format,
        &inventory.devices,
        |d| NodeRow::from(d),
        |d| d.name.clone(),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}
