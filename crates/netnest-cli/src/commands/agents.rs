//! Raw stats from the in-house host agents.

use serde_json::Value;

use netnest_sources::StatusHub;

use crate::cli::{AgentTarget, AgentsArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{self, RenderCtx};

use super::note_absent;

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &StatusHub, args: AgentsArgs, ctx: &RenderCtx) -> Result<(), CliError> {
    match args.target {
        AgentTarget::Server => print_single("server agent", hub.server_agent().await, ctx),
        AgentTarget::Desktop => print_single("desktop agent", hub.desktop_agent().await, ctx),
        AgentTarget::Both => {
            let (server, desktop) = tokio::join!(hub.server_agent(), hub.desktop_agent());
            match ctx.format {
                OutputFormat::Json | OutputFormat::JsonCompact => {
                    let doc = serde_json::json!({ "server": server, "desktop": desktop });
                    let out = if matches!(ctx.format, OutputFormat::JsonCompact) {
                        output::render_json_compact(&doc)
                    } else {
                        output::render_json_pretty(&doc)
                    };
                    output::print_output(&out, ctx.quiet);
                }
                OutputFormat::Table | OutputFormat::Plain => {
                    print_section("server agent", server.as_ref(), ctx);
                    print_section("desktop agent", desktop.as_ref(), ctx);
                }
            }
            Ok(())
        }
    }
}

/// Agent payloads are freeform, so every format renders them as JSON.
fn print_single(name: &str, stats: Option<Value>, ctx: &RenderCtx) -> Result<(), CliError> {
    let Some(stats) = stats else {
        note_absent(name, ctx.quiet);
        return Ok(());
    };
    let out = output::render_single(
        &ctx.format,
        &stats,
        |v| output::render_json_pretty(v),
        |v| output::render_json_compact(v),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn print_section(name: &str, stats: Option<&Value>, ctx: &RenderCtx) {
    if let Some(v) = stats {
        let body = output::render_json_pretty(v);
        let head = output::heading(name, ctx.color);
        output::print_output(&format!("{head}\n{body}"), ctx.quiet);
    } else {
        note_absent(name, ctx.quiet);
    }
}
