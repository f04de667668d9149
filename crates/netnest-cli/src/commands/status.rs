//! Combined status report across every source.
//!
//! Fetches all sources concurrently and renders one document. Absent
//! sources appear as placeholders in the report body rather than
//! failing the command, so one dead backend never hides the rest.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use netnest_sources::speedtest::SpeedSnapshot;
use netnest_sources::{Inventory, StatusHub};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{self, RenderCtx};

use super::{clients, lights, speedtest, vpn};

/// Snapshot of every source at one instant.
#[derive(Serialize)]
struct Report {
    clients: Option<Inventory>,
    smart_devices: Option<Inventory>,
    vpn: Option<Inventory>,
    speedtest: Option<Arc<SpeedSnapshot>>,
    server_agent: Option<Value>,
    desktop_agent: Option<Value>,
}

async fn gather(hub: &StatusHub) -> Report {
    let (clients, smart_devices, vpn, speedtest, server_agent, desktop_agent) = tokio::join!(
        hub.network_clients(),
        hub.smart_devices(),
        hub.vpn_status(),
        hub.bandwidth(),
        hub.server_agent(),
        hub.desktop_agent(),
    );
    Report {
        clients,
        smart_devices,
        vpn,
        speedtest,
        server_agent,
        desktop_agent,
    }
}

// ── Renderers ───────────────────────────────────────────────────────

fn absent(source: &str) -> String {
    format!("{source}: disabled or unavailable")
}

fn section(title: &str, body: &str, color: bool) -> String {
    format!("{}\n{body}", output::heading(title, color))
}

fn table_report(report: &Report, color: bool) -> String {
    let sections = [
        section(
            "Network clients",
            &report
                .clients
                .as_ref()
                .map_or_else(|| absent("controller"), clients::table),
            color,
        ),
        section(
            "Smart devices",
            &report
                .smart_devices
                .as_ref()
                .map_or_else(|| absent("govee"), lights::table),
            color,
        ),
        section(
            "Mesh VPN",
            &report
                .vpn
                .as_ref()
                .map_or_else(|| absent("tailscale"), vpn::table),
            color,
        ),
        section(
            "Bandwidth",
            &report
                .speedtest
                .as_deref()
                .map_or_else(|| absent("speedtest"), speedtest::detail),
            color,
        ),
        section(
            "Server agent",
            &report
                .server_agent
                .as_ref()
                .map_or_else(|| absent("server agent"), output::render_json_pretty),
            color,
        ),
        section(
            "Desktop agent",
            &report
                .desktop_agent
                .as_ref()
                .map_or_else(|| absent("desktop agent"), output::render_json_pretty),
            color,
        ),
    ];
    sections.join("\n\n")
}

/// One `key value` line per source for scripting; absent sources read "-".
fn plain_report(report: &Report) -> String {
    let count = |inv: Option<&Inventory>| inv.map_or_else(|| "-".into(), |i| i.total.to_string());
    let vpn = report.vpn.as_ref().map_or_else(
        || "-".into(),
        |i| {
            let online = i.devices.iter().filter(|d| d.is_online()).count();
            format!("{online}/{}", i.total)
        },
    );
    let speed = report.speedtest.as_deref().map_or_else(
        || "-".into(),
        |s| format!("{:.1} {:.1} {}", s.download_mbps, s.upload_mbps, s.ping_ms),
    );
    let agent = |value: Option<&Value>| if value.is_some() { "ok" } else { "-" };

    [
        format!("clients {}", count(report.clients.as_ref())),
        format!("lights {}", count(report.smart_devices.as_ref())),
        format!("vpn {vpn}"),
        format!("speedtest {speed}"),
        format!("server-agent {}", agent(report.server_agent.as_ref())),
        format!("desktop-agent {}", agent(report.desktop_agent.as_ref())),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &StatusHub, ctx: &RenderCtx) -> Result<(), CliError> {
    let report = gather(hub).await;
    let out = match ctx.format {
        OutputFormat::Table => table_report(&report, ctx.color),
        OutputFormat::Json => output::render_json_pretty(&report),
        OutputFormat::JsonCompact => output::render_json_compact(&report),
        OutputFormat::Plain => plain_report(&report),
    };
    output::print_output(&out, ctx.quiet);
    Ok(())
}
