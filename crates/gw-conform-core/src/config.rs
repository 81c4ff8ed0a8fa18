//! Configuration types for gw-conform.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for gw-conform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Suite to run (e.g., "generic", "package", "style", "all").
    #[serde(default)]
    pub suite: Option<String>,

    /// Severity threshold for test failure (default: "error").
    /// Violations at or above this severity cause `check!()` tests to fail.
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Project location.
    #[serde(default)]
    pub project: ProjectConfig,

    /// External tools used by the style checks.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// How import checks resolve modules.
    #[serde(default)]
    pub imports: ImportsConfig,

    /// Expected `[build-system]` values.
    #[serde(default)]
    pub build_system: BuildSystemConfig,

    /// Per-check configurations, keyed by check name.
    #[serde(default)]
    pub checks: HashMap<String, CheckConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// A relative `project.root` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config = Self::parse(&content)?;
        if let Some(dir) = path.parent() {
            if config.project.root.is_relative() {
                config.project.root = dir.join(&config.project.root);
            }
        }
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a check is enabled.
    #[must_use]
    pub fn is_check_enabled(&self, check_name: &str) -> bool {
        self.checks
            .get(check_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a check.
    #[must_use]
    pub fn check_severity(&self, check_name: &str) -> Option<crate::Severity> {
        self.checks.get(check_name).and_then(|c| c.severity)
    }
}

/// Where the checked project lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// External tools invoked by the style checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Formatter run as `<formatter> --check <dir>`.
    #[serde(default = "default_formatter")]
    pub formatter: String,

    /// Import sorter run as `<import_sorter> --check-only <dir>`.
    #[serde(default = "default_import_sorter")]
    pub import_sorter: String,

    /// Tools that must answer `--version`.
    #[serde(default = "default_required_tools")]
    pub required: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            formatter: default_formatter(),
            import_sorter: default_import_sorter(),
            required: default_required_tools(),
        }
    }
}

fn default_formatter() -> String {
    "black".to_string()
}

fn default_import_sorter() -> String {
    "isort".to_string()
}

fn default_required_tools() -> Vec<String> {
    vec!["ruff".to_string(), "mypy".to_string(), "pytest".to_string()]
}

/// How import checks resolve modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Ask a Python interpreter.
    #[default]
    Interpreter,
    /// Resolve against `src/` without running Python.
    Source,
}

/// Import check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportsConfig {
    /// Resolution mode.
    #[serde(default)]
    pub mode: ImportMode,

    /// Interpreter used in [`ImportMode::Interpreter`].
    #[serde(default = "default_python")]
    pub python: String,
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            mode: ImportMode::default(),
            python: default_python(),
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}

/// Expected `[build-system]` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSystemConfig {
    /// Literal `build-backend` entry point.
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for BuildSystemConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_backend() -> String {
    "poetry.masonry.api".to_string()
}

/// Per-check configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Whether this check is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this check.
    #[serde(default)]
    pub severity: Option<crate::Severity>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(gw_conform::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(gw_conform::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },
}
