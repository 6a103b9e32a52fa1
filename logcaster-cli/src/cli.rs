//! CLI argument definitions using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use logcaster_core::types::Protocol;

/// Logcaster command-line interface.
///
/// Provides local template tooling (render, parse, placeholder listing),
/// one-shot test emission, configuration validation, and job control
/// against a running daemon.
#[derive(Parser, Debug)]
#[command(name = "logcaster")]
#[command(version, about = "Logcaster - network log traffic simulator", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        default_value = "/etc/logcaster/logcaster.toml"
    )]
    pub config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// Machine-readable JSON output
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Template tooling: render, parse, and placeholder listing
    Template(TemplateArgs),
    /// Send rendered log lines to a destination (no daemon required)
    Send(SendArgs),
    /// Control jobs on a running daemon
    Job(JobArgs),
    /// Configuration inspection and validation
    Config(ConfigArgs),
}

// ---- template ----

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub action: TemplateAction,
}

#[derive(Subcommand, Debug)]
pub enum TemplateAction {
    /// Render a template to concrete log lines
    Render {
        /// Template text with `{dotted.path}` / `<name>` placeholders
        #[arg(long)]
        text: String,
        /// Number of lines to render
        #[arg(long, default_value_t = 1)]
        count: u64,
    },
    /// Compile a template and parse a log line against it
    Parse {
        /// Template text with `{dotted.path}` / `<name>` placeholders
        #[arg(long)]
        text: String,
        /// Log line to parse
        #[arg(long)]
        line: String,
    },
    /// List built-in placeholder names
    Placeholders,
}

// ---- send ----

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Transport protocol (tcp or udp)
    #[arg(long)]
    pub protocol: Protocol,

    /// Destination host
    #[arg(long)]
    pub host: String,

    /// Destination port
    #[arg(long)]
    pub port: u16,

    /// Template text to render and send
    #[arg(long)]
    pub text: String,

    /// Number of lines to send
    #[arg(long, default_value_t = 1)]
    pub count: u64,

    /// Interval between sends in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// TCP connect timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub connect_timeout_secs: u64,
}

// ---- job ----

#[derive(Args, Debug)]
pub struct JobArgs {
    #[command(subcommand)]
    pub action: JobAction,
}

#[derive(Subcommand, Debug)]
pub enum JobAction {
    /// Start a seeded job on the daemon
    Start {
        /// Job identifier
        #[arg(long)]
        id: String,
        /// Daemon control socket address
        #[arg(long, default_value = "127.0.0.1:7700")]
        control: String,
    },
    /// Stop a running job on the daemon
    Stop {
        /// Job identifier
        #[arg(long)]
        id: String,
        /// Daemon control socket address
        #[arg(long, default_value = "127.0.0.1:7700")]
        control: String,
    },
}

// ---- config ----

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file
    Validate,
    /// Show the effective configuration
    Show {
        /// Show only one section (general, control, engine, seed, metrics)
        #[arg(long)]
        section: Option<String>,
    },
}
