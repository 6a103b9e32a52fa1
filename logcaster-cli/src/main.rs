//! Logcaster CLI entry point
//!
//! Parses arguments, initialises logging, and dispatches to the
//! subcommand handlers. Logs go to stderr so stdout stays reserved
//! for command output (text or JSON).

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_tracing(args.log_level.as_deref());

    let writer = OutputWriter::new(args.output);

    let result = run(args, &writer).await;
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Cli, writer: &OutputWriter) -> Result<(), CliError> {
    match args.command {
        Commands::Template(template_args) => commands::template::execute(template_args, writer),
        Commands::Send(send_args) => commands::send::execute(send_args, writer).await,
        Commands::Job(job_args) => commands::job::execute(job_args, writer).await,
        Commands::Config(config_args) => {
            commands::config::execute(config_args, &args.config, writer).await
        }
    }
}

/// Initialise tracing to stderr.
///
/// Precedence: `RUST_LOG` env var, then `--log-level`, then `warn`.
/// The CLI defaults to quiet so command output stays parseable.
fn init_tracing(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
