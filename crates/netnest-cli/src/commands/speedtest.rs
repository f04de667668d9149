//! Bandwidth probe results.

use netnest_sources::StatusHub;
use netnest_sources::speedtest::SpeedSnapshot;

use crate::error::CliError;
use crate::output::{self, RenderCtx};

use super::note_absent;

/// Multi-line detail view, shared with the combined status report.
pub(crate) fn detail(snapshot: &SpeedSnapshot) -> String {
    [
        format!("Download:  {:.1} Mbps", snapshot.download_mbps),
        format!("Upload:    {:.1} Mbps", snapshot.upload_mbps),
        format!("Ping:      {} ms", snapshot.ping_ms),
        format!("Measured:  {}", age_label(snapshot.age_minutes())),
    ]
    .join("\n")
}

/// Cached results can be several minutes old.
fn age_label(minutes: i64) -> String {
    if minutes < 1 {
        "just now".to_owned()
    } else {
        format!("{minutes} min ago")
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(hub: &StatusHub, ctx: &RenderCtx) -> Result<(), CliError> {
    let Some(snapshot) = hub.bandwidth().await else {
        note_absent("speedtest", ctx.quiet);
        return Ok(());
    };

    let out = output::render_single(
        &ctx.format,
        snapshot.as_ref(),
        |s| detail(s),
        |s| format!("{:.1} {:.1} {}", s.download_mbps, s.upload_mbps, s.ping_ms),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}
