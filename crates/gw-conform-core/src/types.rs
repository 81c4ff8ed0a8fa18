//! Core types for convention violations and results.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for convention violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a run.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a severity name (`error`, `warning`, `info`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where a violation was found.
///
/// Either a path relative to the project root, or a dotted key inside
/// a configuration file (e.g. `pyproject.toml` + `tool.poetry.license`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path relative to the project root.
    pub file: PathBuf,
    /// Dotted key inside the file, if the violation concerns a config value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Location {
    /// Creates a location pointing at a file or directory.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            key: None,
        }
    }

    /// Creates a location pointing at a key inside a configuration file.
    #[must_use]
    pub fn key(file: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            key: Some(key.into()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}:{key}", self.file.display()),
            None => write!(f, "{}", self.file.display()),
        }
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A convention violation found during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Check code (e.g., "GW207").
    pub code: String,
    /// Check name (e.g., "poetry-has-license").
    pub check: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    pub suggestion: Option<Suggestion>,
    /// Reference to external documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_ref: Option<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        check: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            check: check.into(),
            severity,
            location,
            message: message.into(),
            suggestion: None,
            doc_ref: None,
        }
    }

    /// Adds a documentation reference to this violation.
    #[must_use]
    pub fn with_doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} at {}\n", self.code, self.check, self.location);
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(suggestion) = &self.suggestion {
            let _ = writeln!(output, "  = help: {}", suggestion.message);
        }
        if let Some(doc_ref) = &self.doc_ref {
            let _ = writeln!(output, "  = see: {doc_ref}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location, self.severity, self.code, self.message
        )?;
        if let Some(doc_ref) = &self.doc_ref {
            write!(f, " (see: {doc_ref})")?;
        }
        Ok(())
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ViolationDiagnostic {
    code: String,
    message: String,
    help: Option<String>,
    url: Option<String>,
    severity: Severity,
}

impl Diagnostic for ViolationDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn url<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.url
            .as_ref()
            .map(|u| Box::new(u) as Box<dyn std::fmt::Display + 'a>)
    }
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            code: v.code.clone(),
            message: format!("{} ({})", v.message, v.location),
            help: v.suggestion.as_ref().map(|s| s.message.clone()),
            url: v.doc_ref.clone(),
            severity: v.severity,
        }
    }
}

/// Violation counts of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Violations at [`Severity::Error`].
    pub errors: usize,
    /// Violations at [`Severity::Warning`].
    pub warnings: usize,
    /// Violations at [`Severity::Info`].
    pub infos: usize,
    /// Checks that ran.
    pub checks_run: usize,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s), {} info(s) from {} check(s)",
            self.errors, self.warnings, self.infos, self.checks_run
        )
    }
}

/// Outcome of running checks over one project.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// Violations in check order.
    pub violations: Vec<Violation>,
    /// Number of checks run.
    pub checks_run: usize,
}

impl LintResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies the violations per severity.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.violations.iter().fold(
            Summary {
                checks_run: self.checks_run,
                ..Summary::default()
            },
            |mut summary, v| {
                match v.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Info => summary.infos += 1,
                }
                summary
            },
        )
    }

    /// Violations at or above `threshold`.
    pub fn at_least(&self, threshold: Severity) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.severity >= threshold)
    }

    /// Violations of exactly `severity`.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Whether any violation is at or above `threshold`.
    #[must_use]
    pub fn has_violations_at(&self, threshold: Severity) -> bool {
        self.at_least(threshold).next().is_some()
    }

    /// Whether any violation is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Renders the violations at or above `fail_on` as the panic message of a
    /// failing `cargo test` check.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        let failing: Vec<&Violation> = self.at_least(fail_on).collect();

        let mut report = format!(
            "\n=== gw-conform: {} violation(s) at {fail_on} or above ===\n\n",
            failing.len()
        );
        for violation in failing {
            report.push_str(&violation.format());
            report.push('\n');
        }
        report.push_str(&format!("Total: {}\n", self.summary()));
        report
    }
}
