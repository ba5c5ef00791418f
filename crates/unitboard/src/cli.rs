//! Clap derive structures for the `unitboard` CLI.
//!
//! Layout: global flags shared by every subcommand, then one subcommand
//! per view of the inventory plus config and completions housekeeping.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-level CLI ────────────────────────────────────────────────────

/// unitboard: live unit availability from a spreadsheet export
#[derive(Debug, Parser)]
#[command(
    name = "unitboard",
    version,
    about = "Show live unit availability from a published spreadsheet",
    long_about = "Fetch a building's unit inventory from a CSV or table-query \
        JSON export, normalize messy sheet data, and print per-floor \
        availability and status counts.",
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
    /// Sheet profile to use
    #[arg(long, short = 'p', env = "UNITBOARD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Export URL or spreadsheet id (overrides the profile's source)
    #[arg(long, env = "UNITBOARD_SOURCE", global = true)]
    pub source: Option<String>,

    /// Payload format of the source
    #[arg(long, value_enum, global = true)]
    pub format: Option<PayloadFormat>,

    /// API key appended to the export request
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "UNITBOARD_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color
    #[arg(long, env = "UNITBOARD_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UNITBOARD_INSECURE", global = true)]
    pub insecure: bool,

    /// Fetch timeout in seconds
    #[arg(long, env = "UNITBOARD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Seconds between refreshes (watch only)
    #[arg(long, env = "UNITBOARD_INTERVAL", global = true)]
    pub interval: Option<u64>,

    /// Count booked units as sold
    #[arg(long, global = true)]
    pub merge_booked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// One value per line, for piping
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadFormat {
    /// Sniff the payload
    Auto,
    /// Comma-separated values
    Csv,
    /// Google table-query JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    Available,
    OnHold,
    Booked,
    Sold,
}

// ── Command Tree ─────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List units, grouped by floor (highest first)
    #[command(alias = "ls")]
    Show(ShowArgs),

    /// Show per-status unit counts
    Counts,

    /// Keep refreshing and reprint on every change
    Watch(WatchArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Show ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Show a single unit by id
    pub unit: Option<String>,

    /// Only units on this floor
    #[arg(long)]
    pub floor: Option<i32>,

    /// Only units with this status
    #[arg(long, value_enum)]
    pub status: Option<StatusFilter>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Print status counts instead of the unit list
    #[arg(long)]
    pub counts: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile
    Init(ConfigInitArgs),

    /// Show the resolved configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Profile name to write
    #[arg(long, default_value = "default")]
    pub name: String,

    /// Export URL
    #[arg(long, conflicts_with = "sheet_id", required_unless_present = "sheet_id")]
    pub url: Option<String>,

    /// Google spreadsheet id
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// Worksheet (tab) name
    #[arg(long, requires = "sheet_id")]
    pub sheet: Option<String>,

    /// Environment variable holding the API key
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Replace an existing profile with the same name
    #[arg(long)]
    pub force: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate for
    pub shell: clap_complete::Shell,
}
