//! `logcaster template` command handler

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use logcaster_template::{LogGenerator, TemplatePattern};

use crate::cli::{TemplateAction, TemplateArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `template` command.
pub fn execute(args: TemplateArgs, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        TemplateAction::Render { text, count } => execute_render(&text, count, writer),
        TemplateAction::Parse { text, line } => execute_parse(&text, &line, writer),
        TemplateAction::Placeholders => execute_placeholders(writer),
    }
}

/// Render a template `count` times with fresh synthesized values.
fn execute_render(text: &str, count: u64, writer: &OutputWriter) -> Result<(), CliError> {
    debug!(template = text, count, "rendering template");

    let generator = LogGenerator::new();
    let lines: Vec<String> = (0..count).map(|_| generator.render(text)).collect();

    writer.render(&RenderReport {
        template: text.to_owned(),
        lines,
    })
}

/// Compile a template and parse one log line against it.
///
/// A non-matching line is not an error. The outcome is reported and the
/// process still exits 0, so scripted callers inspect the JSON output.
fn execute_parse(text: &str, line: &str, writer: &OutputWriter) -> Result<(), CliError> {
    debug!(template = text, "compiling template pattern");

    let pattern = TemplatePattern::compile(text)?;
    let outcome = pattern.parse(line);

    writer.render(&ParseReport {
        template: text.to_owned(),
        line: line.to_owned(),
        matched: outcome.matched,
        fields: outcome.fields,
        reason: outcome.reason,
    })
}

/// List the built-in placeholder registry.
fn execute_placeholders(writer: &OutputWriter) -> Result<(), CliError> {
    let generator = LogGenerator::new();
    let placeholders: Vec<String> = generator
        .placeholders()
        .into_iter()
        .map(str::to_owned)
        .collect();

    writer.render(&PlaceholdersReport { placeholders })
}

/// Rendered log lines for one template.
#[derive(Serialize)]
pub struct RenderReport {
    /// Template text as given
    pub template: String,
    /// Rendered lines, one per requested count
    pub lines: Vec<String>,
}

impl Render for RenderReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for line in &self.lines {
            writeln!(w, "{}", line)?;
        }
        Ok(())
    }
}

/// Parse outcome for one template/line pair.
#[derive(Serialize)]
pub struct ParseReport {
    /// Template text as given
    pub template: String,
    /// Log line that was parsed
    pub line: String,
    /// Whether the line matched the template pattern
    pub matched: bool,
    /// Recovered nested fields (present when matched)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
    /// Failure reason (present when not matched)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Render for ParseReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.matched {
            writeln!(w, "Result: {}", "MATCHED".green().bold())?;
            if let Some(ref fields) = self.fields {
                let pretty = serde_json::to_string_pretty(fields)
                    .unwrap_or_else(|e| format!("(serialization error: {})", e));
                writeln!(w, "{}", pretty)?;
            }
        } else {
            writeln!(w, "Result: {}", "NOT MATCHED".red().bold())?;
            if let Some(ref reason) = self.reason {
                writeln!(w, "Reason: {}", reason)?;
            }
        }
        Ok(())
    }
}

/// Built-in placeholder names.
#[derive(Serialize)]
pub struct PlaceholdersReport {
    /// Sorted placeholder names from the built-in registry
    pub placeholders: Vec<String>,
}

impl Render for PlaceholdersReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Built-in placeholders ({}):", self.placeholders.len())?;
        for name in &self.placeholders {
            writeln!(w, "  {{{}}}", name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_render_report_text_one_line_per_render() {
        let report = RenderReport {
            template: "srcip={source.ip}".to_owned(),
            lines: vec!["srcip=1.2.3.4".to_owned(), "srcip=5.6.7.8".to_owned()],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert_eq!(output.lines().count(), 2, "one output line per rendered line");
        assert!(output.contains("srcip=1.2.3.4"));
    }

    #[test]
    fn test_parse_report_text_matched_shows_fields() {
        let report = ParseReport {
            template: "srcip={source.ip}".to_owned(),
            line: "srcip=1.2.3.4".to_owned(),
            matched: true,
            fields: Some(serde_json::json!({"source": {"ip": "1.2.3.4"}})),
            reason: None,
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("MATCHED"), "should show match status");
        assert!(output.contains("1.2.3.4"), "should show recovered fields");
    }

    #[test]
    fn test_parse_report_text_unmatched_shows_reason() {
        let report = ParseReport {
            template: "srcip={source.ip}".to_owned(),
            line: "different format entirely".to_owned(),
            matched: false,
            fields: None,
            reason: Some("line does not match template pattern".to_owned()),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("NOT MATCHED"));
        assert!(output.contains("does not match"));
    }

    #[test]
    fn test_parse_report_json_skips_absent_fields() {
        let report = ParseReport {
            template: "t".to_owned(),
            line: "l".to_owned(),
            matched: false,
            fields: None,
            reason: Some("no match".to_owned()),
        };

        let json = serde_json::to_string(&report).expect("JSON serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should parse JSON");

        assert!(parsed.get("fields").is_none(), "absent fields should be skipped");
        assert_eq!(parsed["reason"].as_str(), Some("no match"));
    }

    #[test]
    fn test_placeholders_report_lists_registry_names() {
        let generator = LogGenerator::new();
        let report = PlaceholdersReport {
            placeholders: generator
                .placeholders()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        };

        assert!(
            report.placeholders.iter().any(|p| p == "source.ip"),
            "registry should contain source.ip"
        );

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("{source.ip}"), "should list placeholder in braces");
    }

    #[test]
    fn test_execute_render_produces_concrete_lines() {
        let writer = OutputWriter::new(OutputFormat::Text);
        let args = TemplateArgs {
            action: TemplateAction::Render {
                text: "srcip={source.ip} action={event.action}".to_owned(),
                count: 3,
            },
        };

        execute(args, &writer).expect("render should succeed");
    }

    #[test]
    fn test_execute_parse_rejects_ambiguous_template() {
        let writer = OutputWriter::new(OutputFormat::Text);
        let args = TemplateArgs {
            action: TemplateAction::Parse {
                text: "{a} {a.b}".to_owned(),
                line: "x y".to_owned(),
            },
        };

        let err = execute(args, &writer).expect_err("ambiguous template should fail");
        assert_eq!(err.exit_code(), 1);
    }
}
