//! Clap derive structures for the `petkit` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// petkit -- command-line access to PetKit smart pet devices
#[derive(Debug, Parser)]
#[command(
    name = "petkit",
    version,
    about = "Control PetKit feeders, litter boxes, fountains and purifiers",
    long_about = "Talks to the PetKit cloud the way the mobile app does.\n\n\
        Lists devices and pets, reads typed status, and sends device actions\n\
        such as cleaning cycles, manual feeds and light or power toggles.",
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
    /// Account profile to use
    #[arg(long, short = 'p', env = "PETKIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Account email or phone number (overrides profile)
    #[arg(long, short = 'u', env = "PETKIT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Region name or id, e.g. US, Germany, CN (overrides profile)
    #[arg(long, short = 'r', env = "PETKIT_REGION", global = true)]
    pub region: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PETKIT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PETKIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and show the bound region and session
    Login(LoginArgs),

    /// List and inspect devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show typed status for a device
    #[command(alias = "st")]
    Status(StatusArgs),

    /// List pets on the account
    Pets,

    /// Send an action to a device
    #[command(alias = "ctl")]
    Control(ControlArgs),

    /// Change a single device setting
    Setting(SettingArgs),

    /// Call any vendor endpoint with the current session
    Api(ApiArgs),

    /// List the actions a device type accepts
    Actions(ActionsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Ask the server to send a one-time login code, then exit
    #[arg(long, conflicts_with = "code")]
    pub request_code: bool,

    /// Log in with a one-time code instead of the password
    #[arg(long)]
    pub code: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List every device with detail information (pets included)
    #[command(alias = "ls")]
    List {
        /// Only show this family (feeder, litter, water_fountain, purifier, pet)
        #[arg(long, short = 'k')]
        kind: Option<String>,
    },

    /// Show one device
    Get {
        /// Device id
        id: i64,

        /// Include the raw vendor payload and auxiliary data
        #[arg(long)]
        raw: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Device id
    pub id: i64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONTROL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ControlArgs {
    /// Device id
    pub id: i64,

    /// Action name (clean, dump, feed, light_on, set_purifier_mode, ...)
    pub action: String,

    /// Action settings as a JSON object, e.g. '{"amount": 20}'
    #[arg(long, short = 's')]
    pub settings: Option<String>,
}

#[derive(Debug, Args)]
pub struct SettingArgs {
    /// Device id
    pub id: i64,

    /// Setting key as the vendor names it (e.g. lightMode)
    pub key: String,

    /// New value; parsed as JSON, falling back to a plain string
    pub value: String,
}

#[derive(Debug, Args)]
pub struct ActionsArgs {
    /// Device type code (t4, d4s, w5, k2, ...). Omit to list every action.
    pub type_code: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  API PASSTHROUGH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Args)]
pub struct ApiArgs {
    /// HTTP method
    pub method: HttpMethod,

    /// Path relative to the regional base URL (e.g. t4/owndevices)
    pub path: String,

    /// Form parameters as key=value
    #[arg(value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
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
    /// Display current configuration with secrets masked
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Add or replace a profile
    Add {
        /// Profile name
        name: String,

        /// Account email or phone number
        #[arg(long)]
        username: String,

        /// Region name or id
        #[arg(long)]
        region: Option<String>,

        /// IANA timezone
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
