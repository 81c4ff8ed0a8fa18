//! Shared output formatting for check results.

use anyhow::Result;
use gw_conform_core::{LintResult, ViolationDiagnostic};
use miette::GraphicalReportHandler;
use std::fmt::Write;

use crate::OutputFormat;

/// Print check results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Compact => render_compact(result),
        OutputFormat::Fancy => render_fancy(result)?,
    };
    println!("{rendered}");
    Ok(())
}

fn render_text(result: &LintResult) -> String {
    let summary = result.summary();
    let mut out = String::new();

    for violation in &result.violations {
        out.push_str(&violation.format());
        out.push('\n');
    }

    let summary_color = if summary.errors > 0 {
        "\x1b[31m"
    } else if summary.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let _ = write!(out, "{summary_color}Found {summary}\x1b[0m");
    out
}

fn render_compact(result: &LintResult) -> String {
    result
        .violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_fancy(result: &LintResult) -> Result<String> {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for violation in &result.violations {
        let diagnostic = ViolationDiagnostic::from(violation);
        handler.render_report(&mut out, &diagnostic)?;
        out.push('\n');
    }
    let _ = write!(out, "Found {}", result.summary());
    Ok(out)
}
