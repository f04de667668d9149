//! Command dispatch: bridges CLI args -> hub queries -> output formatting.

pub mod agents;
pub mod clients;
pub mod config_cmd;
pub mod lights;
pub mod speedtest;
pub mod status;
pub mod vpn;

use netnest_sources::{Device, StatusHub};

use crate::cli::Command;
use crate::error::CliError;
use crate::output::RenderCtx;

/// Dispatch a hub-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, hub: &StatusHub, ctx: &RenderCtx) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(hub, ctx).await,
        Command::Clients => clients::handle(hub, ctx).await,
        Command::Lights(args) => lights::handle(hub, args, ctx).await,
        Command::Vpn => vpn::handle(hub, ctx).await,
        Command::Speedtest => speedtest::handle(hub, ctx).await,
        Command::Agents(args) => agents::handle(hub, args, ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Report a source that returned nothing. An absent source is normal
/// operation (disabled in config, backend unreachable), so the note
/// goes to stderr and the command still exits zero.
pub(crate) fn note_absent(source: &str, quiet: bool) {
    if !quiet {
        eprintln!("{source}: disabled or unavailable");
    }
}

/// One identifier per line for plain output. Prefers the stable
/// hardware identity, falls back to the display name.
pub(crate) fn plain_id(device: &Device) -> String {
    if device.identity.is_empty() {
        device.name.clone()
    } else {
        device.identity.clone()
    }
}
