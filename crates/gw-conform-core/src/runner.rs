//! Orchestrates a run of convention checks over one project.

use crate::check::{Check, CheckBox, CheckError};
use crate::config::Config;
use crate::context::{ProjectContext, Session};
use crate::metadata::ProjectError;
use crate::process::{SystemToolRunner, ToolRunner};
use crate::registry::ModuleRegistry;
use crate::types::{LintResult, Severity, Violation};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during a run.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum RunnerError {
    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The project's pyproject could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Project(#[from] ProjectError),

    /// A check could not be evaluated.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Check(#[from] CheckError),

    /// Invalid check selection pattern.
    #[error("Invalid check pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Builder for configuring a [`Runner`].
#[derive(Default)]
pub struct RunnerBuilder {
    root: Option<PathBuf>,
    checks: Vec<CheckBox>,
    only: Vec<String>,
    exclude: Vec<String>,
    config: Option<Config>,
    tools: Option<Arc<dyn ToolRunner>>,
    modules: Option<Arc<dyn ModuleRegistry>>,
}

impl RunnerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root to check.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a check.
    #[must_use]
    pub fn check<C: Check + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Adds a boxed check.
    #[must_use]
    pub fn check_box(mut self, check: CheckBox) -> Self {
        self.checks.push(check);
        self
    }

    /// Adds several boxed checks.
    #[must_use]
    pub fn checks(mut self, checks: impl IntoIterator<Item = CheckBox>) -> Self {
        self.checks.extend(checks);
        self
    }

    /// Restricts the run to checks whose name or code matches a glob pattern.
    ///
    /// Can be called several times; a check runs if any pattern matches.
    #[must_use]
    pub fn only(mut self, pattern: impl Into<String>) -> Self {
        self.only.push(pattern.into());
        self
    }

    /// Skips checks whose name or code matches a glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the tool runner (default: [`SystemToolRunner`]).
    #[must_use]
    pub fn tool_runner(mut self, tools: Arc<dyn ToolRunner>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Replaces the module registry (default: chosen by `config.imports`).
    #[must_use]
    pub fn module_registry(mut self, modules: Arc<dyn ModuleRegistry>) -> Self {
        self.modules = Some(modules);
        self
    }

    /// Builds the runner.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be resolved or a
    /// selection pattern is invalid.
    pub fn build(self) -> Result<Runner, RunnerError> {
        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.project.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let compile = |patterns: Vec<String>| -> Result<Vec<glob::Pattern>, glob::PatternError> {
            patterns.iter().map(|p| glob::Pattern::new(p)).collect()
        };

        Ok(Runner {
            root,
            checks: self.checks,
            only: compile(self.only)?,
            exclude: compile(self.exclude)?,
            config: self.config.unwrap_or_default(),
            tools: self.tools.unwrap_or_else(|| Arc::new(SystemToolRunner)),
            modules: self.modules,
        })
    }
}

/// Runs a set of checks against one project.
///
/// Use [`Runner::builder()`] to construct an instance.
pub struct Runner {
    root: PathBuf,
    checks: Vec<CheckBox>,
    only: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
    config: Config,
    tools: Arc<dyn ToolRunner>,
    modules: Option<Arc<dyn ModuleRegistry>>,
}

impl Runner {
    /// Creates a new builder for configuring a runner.
    #[must_use]
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::new()
    }

    /// Returns the project root being checked.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Builds the session this runner's checks would see.
    ///
    /// # Errors
    ///
    /// Returns an error if the project's pyproject cannot be parsed.
    pub fn session(&self) -> Result<Session, RunnerError> {
        let project = ProjectContext::load(&self.root)?;
        let session = Session::new(project, &self.config, Arc::clone(&self.tools));
        Ok(match &self.modules {
            Some(modules) => session.with_modules(Arc::clone(modules)),
            None => session,
        })
    }

    /// Loads the session and runs every selected check.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be built or a check fails fatally.
    pub fn run(&self) -> Result<LintResult, RunnerError> {
        info!("Checking project at {:?}", self.root);
        let session = self.session()?;
        self.run_with(&session)
    }

    /// Runs every selected check against an existing session.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails fatally.
    pub fn run_with(&self, session: &Session) -> Result<LintResult, RunnerError> {
        let mut result = LintResult::new();

        for check in &self.checks {
            if !self.is_selected(check.as_ref()) {
                debug!("Skipping check: {}", check.name());
                continue;
            }

            debug!("Running {} ({})", check.name(), check.code());
            let violations = check.run(session)?;
            let violations = self.apply_severity_override(check.name(), violations);
            for v in violations.iter().filter(|v| v.severity == Severity::Warning) {
                warn!("{}: {}", v.check, v.message);
            }
            result.violations.extend(violations);
            result.checks_run += 1;
        }

        info!(
            "Run complete: {} violations from {} checks",
            result.violations.len(),
            result.checks_run
        );

        Ok(result)
    }

    /// Whether a check passes configuration and pattern filters.
    fn is_selected(&self, check: &dyn Check) -> bool {
        if !self.config.is_check_enabled(check.name()) {
            return false;
        }
        let matches = |p: &glob::Pattern| p.matches(check.name()) || p.matches(check.code());
        if self.exclude.iter().any(matches) {
            return false;
        }
        self.only.is_empty() || self.only.iter().any(matches)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        check_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.check_severity(check_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }
}
