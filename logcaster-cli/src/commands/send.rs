//! `logcaster send` command handler
//!
//! One-shot or looped test emission without a running daemon. Renders the
//! template locally and sends each line through the engine's transport.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use logcaster_engine::{LogSender, NetSender};
use logcaster_template::LogGenerator;

use crate::cli::SendArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `send` command.
///
/// Sends `count` rendered lines with `interval_ms` between sends. The first
/// transport failure aborts the loop; lines sent so far stay sent.
pub async fn execute(args: SendArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let destination = format!("{}:{}", args.host, args.port);
    info!(
        protocol = %args.protocol,
        destination = %destination,
        count = args.count,
        "sending rendered lines"
    );

    let sender = NetSender::new(args.connect_timeout_secs);
    let generator = LogGenerator::new();

    let mut sent = 0u64;
    let mut failure = None;
    for i in 0..args.count {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }
        let line = generator.render(&args.text);
        match sender.send(args.protocol, &destination, &line).await {
            Ok(()) => sent += 1,
            Err(e) => {
                failure = Some(e.to_string());
                break;
            }
        }
    }

    let report = SendReport {
        protocol: args.protocol.to_string(),
        destination,
        requested: args.count,
        sent,
        error: failure,
    };
    writer.render(&report)?;

    match report.error {
        Some(reason) => Err(CliError::Command(format!("send failed: {}", reason))),
        None => Ok(()),
    }
}

/// Result of a test emission run.
#[derive(Serialize)]
pub struct SendReport {
    /// Transport protocol used
    pub protocol: String,
    /// Destination `host:port`
    pub destination: String,
    /// Number of lines requested
    pub requested: u64,
    /// Number of lines actually sent
    pub sent: u64,
    /// First transport failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Render for SendReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Sent {}/{} lines to {} ({})",
            self.sent, self.requested, self.destination, self.protocol
        )?;
        if let Some(ref error) = self.error {
            writeln!(w, "  Error: {}", error.red())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, SendArgs};
    use crate::output::OutputWriter;

    use logcaster_core::types::Protocol;
    use tokio::net::UdpSocket;

    #[test]
    fn test_send_report_text_success() {
        let report = SendReport {
            protocol: "UDP".to_owned(),
            destination: "127.0.0.1:5514".to_owned(),
            requested: 5,
            sent: 5,
            error: None,
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Sent 5/5 lines"));
        assert!(output.contains("127.0.0.1:5514"));
        assert!(!output.contains("Error"), "success should not show an error");
    }

    #[test]
    fn test_send_report_text_partial_failure() {
        let report = SendReport {
            protocol: "TCP".to_owned(),
            destination: "127.0.0.1:601".to_owned(),
            requested: 10,
            sent: 3,
            error: Some("connect failed: connection refused".to_owned()),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Sent 3/10 lines"));
        assert!(output.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_execute_sends_rendered_udp_lines() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("should bind");
        let addr = socket.local_addr().expect("should have addr");

        let writer = OutputWriter::new(OutputFormat::Text);
        let args = SendArgs {
            protocol: Protocol::Udp,
            host: addr.ip().to_string(),
            port: addr.port(),
            text: "srcip={source.ip}".to_owned(),
            count: 2,
            interval_ms: 1,
            connect_timeout_secs: 5,
        };

        execute(args, &writer).await.expect("send should succeed");

        let mut buf = [0u8; 1024];
        let (n, _) = socket.recv_from(&mut buf).await.expect("should receive");
        let line = String::from_utf8_lossy(&buf[..n]);
        assert!(line.starts_with("srcip="), "placeholder should be rendered");
        assert!(!line.contains('{'), "no placeholder syntax should remain");
    }

    #[tokio::test]
    async fn test_execute_reports_tcp_connect_failure() {
        // Bind then drop to get a port that is definitely closed
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        drop(listener);

        let writer = OutputWriter::new(OutputFormat::Text);
        let args = SendArgs {
            protocol: Protocol::Tcp,
            host: addr.ip().to_string(),
            port: addr.port(),
            text: "hello".to_owned(),
            count: 1,
            interval_ms: 1,
            connect_timeout_secs: 1,
        };

        let err = execute(args, &writer).await.expect_err("send should fail");
        assert_eq!(err.exit_code(), 1);
    }
}
