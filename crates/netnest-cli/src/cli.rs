//! Clap derive structures for the `netnest` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netnest -- one view over the home network
#[derive(Debug, Parser)]
#[command(
    name = "netnest",
    version,
    about = "Aggregate home-network status from the command line",
    long_about = "Collects controller clients, smart devices, mesh-VPN nodes,\n\
        bandwidth measurements, and host agent stats behind one command tree.\n\
        Sources that are disabled or unreachable render as placeholders\n\
        instead of failing the whole invocation.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (default: platform config directory)
    #[arg(long, env = "NETNEST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (default from config, else table)
    #[arg(long, short = 'o', env = "NETNEST_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full status overview across every source
    #[command(alias = "st")]
    Status,

    /// List stations known to the network controller
    #[command(alias = "cl")]
    Clients,

    /// List and control smart devices
    #[command(alias = "govee")]
    Lights(LightsArgs),

    /// List mesh-VPN nodes
    Vpn,

    /// Measure bandwidth (or reuse a recent cached reading)
    Speedtest,

    /// Fetch raw stats from the host agents
    Agents(AgentsArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIGHTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List discovered smart devices
    #[command(alias = "ls")]
    List,

    /// Switch a device's power state
    Turn {
        /// Device identifier (from `lights list`)
        device: String,

        /// Model / SKU string, e.g. "H6159"
        model: String,

        /// Power on (default) or off
        #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
        on: bool,
    },

    /// Send a raw command by name and value
    Send {
        /// Device identifier (from `lights list`)
        device: String,

        /// Model / SKU string
        model: String,

        /// Command name, e.g. "brightness"
        name: String,

        /// Value as JSON ("50", "\"on\""); bare words pass as strings
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AGENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AgentsArgs {
    /// Which agent to query
    #[arg(value_enum, default_value = "both")]
    pub target: AgentTarget,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AgentTarget {
    Both,
    Server,
    Desktop,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
