use thiserror::Error;

/// Top-level error type for the `netnest-sources` crate.
///
/// Covers every failure mode across all sources: controller sessions,
/// HTTP transport, external commands, and payload decoding. Source
/// entry points catch these internally and surface sentinel absences
/// (`None`, empty contributions) to callers; the CLI maps the few that
/// escape into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// A required setting (base URL, credential) is absent or blank.
    #[error("Source not configured: missing {0}")]
    NotConfigured(&'static str),

    // ── Authentication ──────────────────────────────────────────────
    /// Every candidate login path was tried and none produced a session cookie.
    #[error("Controller sign-in failed on all login paths")]
    LoginFailed,

    /// The controller rejected an established session (401/403-class).
    #[error("Session rejected by controller (HTTP {status})")]
    SessionRejected { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── External commands ───────────────────────────────────────────
    /// Spawning or collecting an external command failed at the OS level.
    #[error("Command I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An external command outlived its wall-clock budget and was killed.
    #[error("Command timed out after {timeout_secs}s")]
    CommandTimeout { timeout_secs: u64 },

    /// An external command exited with a non-zero status.
    #[error("Command exited with status {code}")]
    CommandFailed { code: i32 },

    /// An empty argv was supplied.
    #[error("Empty command line")]
    EmptyCommandLine,

    // ── Data ────────────────────────────────────────────────────────
    /// A response body decoded, but matched none of the accepted shapes.
    #[error("Unexpected payload shape: {0}")]
    UnexpectedPayload(&'static str),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if this error means the cached session is no
    /// longer valid and should be dropped before the next call.
    pub fn is_session_rejection(&self) -> bool {
        matches!(self, Self::SessionRejected { .. })
    }

    /// Returns `true` if this is a transient transport-level failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::CommandTimeout { .. } => true,
            _ => false,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
