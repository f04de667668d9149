// External command execution
//
// One primitive: run argv with a wall-clock timeout, capture stdout
// with stderr merged in, report the exit code. The bandwidth probe and
// the mesh-VPN source both go through here.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Captured output of a finished command.
#[derive(Debug, Clone)]
pub struct Capture {
    pub exit_code: i32,
    /// stdout with stderr appended, lossily decoded.
    pub output: String,
}

impl Capture {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `argv` to completion, waiting at most `timeout`.
///
/// The child is spawned with stdin closed and both output streams
/// piped. On expiry the wait future is dropped, which kills the child
/// (`kill_on_drop`), and `Error::CommandTimeout` is returned; the
/// caller never blocks past the timeout. A killed-by-signal exit
/// reports code `-1`.
pub async fn run(argv: &[String], timeout: Duration) -> Result<Capture> {
    let (program, args) = argv.split_first().ok_or(Error::EmptyCommandLine)?;

    debug!(command = %program, args = args.len(), "spawning external command");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let out = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| Error::CommandTimeout {
            timeout_secs: timeout.as_secs(),
        })??;

    let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
    if !out.stderr.is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&String::from_utf8_lossy(&out.stderr));
    }

    Ok(Capture {
        exit_code: out.status.code().unwrap_or(-1),
        output,
    })
}
