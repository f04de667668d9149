//! CLI error types with miette diagnostics.
//!
//! Only genuine failures surface here. Disabled or unreachable sources
//! are rendered as placeholders by the command handlers and never reach
//! this module.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes for error classes the CLI produces itself. Usage errors
/// exit with clap's own code 2.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const CONTROL: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(
        code(netnest::config),
        help("Check the config file (netnest config path) and NETNEST_* environment overrides.")
    )]
    Config(#[from] netnest_config::ConfigError),

    #[error(transparent)]
    #[diagnostic(code(netnest::source))]
    Source(#[from] netnest_sources::Error),

    #[error("Control failed: {message}")]
    #[diagnostic(
        code(netnest::control),
        help(
            "Check the API key, the device identifier and model,\n\
             and that the device supports this command."
        )
    )]
    ControlFailed { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit_code::CONFIG,
            Self::ControlFailed { .. } => exit_code::CONTROL,
            Self::Source(_) => exit_code::GENERAL,
        }
    }
}
