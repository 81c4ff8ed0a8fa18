//! Running external command-line tools.
//!
//! Checks never spawn processes directly; they go through [`ToolRunner`] so the
//! assertion logic can be exercised with a scripted runner in tests.

use std::path::Path;
use std::process::Command;

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// A successful invocation with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given exit code and output.
    #[must_use]
    pub fn failure(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the tool exited with status zero.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }
}

/// The tool could not be started at all.
#[derive(Debug, thiserror::Error)]
#[error("failed to launch `{program}`: {source}")]
pub struct LaunchError {
    /// Program that failed to launch.
    pub program: String,
    /// Underlying IO error (usually `NotFound`).
    pub source: std::io::Error,
}

/// Runs an external tool and captures its output.
pub trait ToolRunner: Send + Sync {
    /// Runs `program` with `args` in `cwd`, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] if the process cannot be spawned.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<ToolOutput, LaunchError>;
}

/// [`ToolRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<ToolOutput, LaunchError> {
        tracing::debug!("Running `{} {}` in {}", program, args.join(" "), cwd.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| LaunchError {
                program: program.to_string(),
                source: e,
            })?;

        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_launch_error() {
        let err = SystemToolRunner
            .run("gw-conform-definitely-not-installed", &["--version"], Path::new("."))
            .unwrap_err();
        assert_eq!(err.program, "gw-conform-definitely-not-installed");
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn output_success_flags() {
        assert!(ToolOutput::success("ok").succeeded());
        assert!(!ToolOutput::failure(1, "", "boom").succeeded());
        assert!(!ToolOutput::default().succeeded());
    }
}
