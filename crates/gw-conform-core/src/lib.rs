//! # gw-conform-core
//!
//! Core framework for checking GeneWeaver Python projects against the
//! shared repository conventions.
//!
//! This crate provides the foundational traits and types for building
//! convention checks. It includes:
//!
//! - [`Check`] trait for a single independent convention check
//! - [`Session`] holding the project facts and the tool/module seams
//! - [`Runner`] for orchestrating a run
//! - [`Violation`] for representing findings
//!
//! ## Example
//!
//! ```ignore
//! use gw_conform_core::{Runner, Severity};
//!
//! let runner = Runner::builder()
//!     .root("./geneweaver-client")
//!     .check(MyCheck)
//!     .build()?;
//!
//! let result = runner.run()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod config;
mod context;
mod runner;
mod types;

/// Reading `pyproject.toml` and deriving the package identity.
pub mod metadata;
/// Running external command-line tools.
pub mod process;
/// Answering "can this module be imported" queries.
pub mod registry;

pub use check::{Category, Check, CheckBox, CheckError};
pub use config::{
    BuildSystemConfig, CheckConfig, Config, ConfigError, ImportMode, ImportsConfig, ProjectConfig,
    ToolsConfig,
};
pub use context::{ProjectContext, ProjectLayout, Session, PYPROJECT_FILE};
pub use runner::{Runner, RunnerBuilder, RunnerError};
pub use types::{
    LintResult, Location, Severity, Suggestion, Summary, Violation, ViolationDiagnostic,
};
