//! `logcaster job` command handler
//!
//! Publishes a `START:<id>` / `STOP:<id>` line to the daemon's control
//! socket and reports the one-line reply.

use std::io::Write;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::info;

use logcaster_core::command::Command;

use crate::cli::{JobAction, JobArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `job` command.
pub async fn execute(args: JobArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let (command, control) = match args.action {
        JobAction::Start { id, control } => (Command::Start { job_id: id }, control),
        JobAction::Stop { id, control } => (Command::Stop { job_id: id }, control),
    };
    let reply = publish(&command, &control).await?;
    let accepted = reply.starts_with("OK");

    let report = JobCommandReport {
        command: command.to_string(),
        job_id: command.job_id().to_owned(),
        control,
        accepted,
        reply,
    };
    writer.render(&report)?;

    if !report.accepted {
        return Err(CliError::Command(format!(
            "daemon rejected {}: {}",
            report.command, report.reply
        )));
    }
    Ok(())
}

/// Send one command line to the control socket and read the reply.
///
/// # Errors
///
/// Returns [`CliError::ControlUnreachable`] when the socket cannot be
/// connected, and [`CliError::Io`] for failures after the connection
/// is established.
async fn publish(command: &Command, control: &str) -> Result<String, CliError> {
    info!(command = %command, control, "publishing control command");

    let stream = TcpStream::connect(control)
        .await
        .map_err(|e| CliError::ControlUnreachable(format!("{}: {}", control, e)))?;

    let mut reader = BufReader::new(stream);
    reader
        .get_mut()
        .write_all(format!("{}\n", command).as_bytes())
        .await?;

    let mut reply = String::new();
    reader.read_line(&mut reply).await?;
    Ok(reply.trim_end().to_owned())
}

/// Outcome of one control command.
#[derive(Serialize)]
pub struct JobCommandReport {
    /// Wire-format command that was sent
    pub command: String,
    /// Target job identifier
    pub job_id: String,
    /// Control socket address
    pub control: String,
    /// Whether the daemon accepted the command
    pub accepted: bool,
    /// Raw reply line from the daemon
    pub reply: String,
}

impl Render for JobCommandReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let status = if self.accepted {
            "ACCEPTED".green().bold()
        } else {
            "REJECTED".red().bold()
        };
        writeln!(w, "{} {} ({})", self.command, status, self.control)?;
        if !self.accepted {
            writeln!(w, "  Reply: {}", self.reply)?;
        }
        Ok(())
    }
}
