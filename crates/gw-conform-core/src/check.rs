//! Check trait for defining convention checks.

use crate::context::Session;
use crate::process::LaunchError;
use crate::types::{Severity, Violation};

/// Which part of the convention a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Directory and file layout.
    Structure,
    /// `[tool.poetry]` and `[build-system]` metadata.
    Metadata,
    /// `[tool.ruff]` configuration.
    Lint,
    /// External formatter and tool checks.
    Style,
    /// Importability of the package.
    Imports,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Structure => "structure",
            Self::Metadata => "metadata",
            Self::Lint => "lint",
            Self::Style => "style",
            Self::Imports => "imports",
        };
        f.write_str(name)
    }
}

/// Fatal failures that abort a run instead of producing violations.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CheckError {
    /// An external tool could not be started.
    #[error("{check}: {source}")]
    #[diagnostic(
        code(gw_conform::check::tool_launch),
        help("install the tool in the active environment or change it in gw-conform.toml")
    )]
    ToolLaunch {
        /// Name of the check that needed the tool.
        check: String,
        /// Launch failure.
        #[source]
        source: LaunchError,
    },
}

impl CheckError {
    /// Wraps a launch failure for `check`.
    #[must_use]
    pub fn launch(check: &str, source: LaunchError) -> Self {
        Self::ToolLaunch {
            check: check.to_string(),
            source,
        }
    }
}

/// A single, independent convention check.
///
/// Checks receive the shared [`Session`] and report every broken convention as
/// a [`Violation`]. Returning `Err` aborts the whole run and is reserved for
/// conditions the check cannot evaluate at all (e.g. a tool that cannot start).
///
/// # Example
///
/// ```ignore
/// use gw_conform_core::{Check, Category, Location, Session, Severity, Violation, CheckError};
///
/// pub struct RequireChangelog;
///
/// impl Check for RequireChangelog {
///     fn name(&self) -> &'static str { "has-changelog" }
///     fn code(&self) -> &'static str { "GW900" }
///     fn category(&self) -> Category { Category::Structure }
///
///     fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
///         if session.root().join("CHANGELOG.md").is_file() {
///             return Ok(vec![]);
///         }
///         Ok(vec![Violation::new(
///             self.code(),
///             self.name(),
///             self.default_severity(),
///             Location::new("CHANGELOG.md"),
///             "CHANGELOG.md file not found",
///         )])
///     }
/// }
/// ```
pub trait Check: Send + Sync {
    /// Returns the kebab-case name of this check (e.g., "has-src-directory").
    fn name(&self) -> &'static str;

    /// Returns the check code (e.g., "GW101").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this check verifies.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the category of this check.
    fn category(&self) -> Category;

    /// Returns the default severity for violations from this check.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Runs the check against the session.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] when the check cannot be evaluated.
    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError>;
}

/// Type alias for boxed Check trait objects.
pub type CheckBox = Box<dyn Check>;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCheck;

    impl Check for TestCheck {
        fn name(&self) -> &'static str {
            "test-check"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn description(&self) -> &'static str {
            "A test check"
        }
        fn category(&self) -> Category {
            Category::Structure
        }
        fn run(&self, _session: &Session) -> Result<Vec<Violation>, CheckError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_check_trait_defaults() {
        let check = TestCheck;
        assert_eq!(check.name(), "test-check");
        assert_eq!(check.code(), "TEST001");
        assert_eq!(check.default_severity(), Severity::Error);
        assert_eq!(check.category().to_string(), "structure");
    }

    #[test]
    fn launch_error_message_names_check() {
        let err = CheckError::launch(
            "formatter-src",
            LaunchError {
                program: "black".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
        );
        assert!(err.to_string().starts_with("formatter-src: failed to launch `black`"));
    }
}
