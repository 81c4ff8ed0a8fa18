//! # gw-conform
//!
//! Convention checks for GeneWeaver Python projects.
//!
//! This is the main facade crate that re-exports core functionality, macros, and checks.
//!
//! ## Quick Start: `cargo test` Integration
//!
//! ```toml
//! [dev-dependencies]
//! gw-conform = "0.3"
//! ```
//!
//! ```rust,ignore
//! // tests/conformance.rs
//! gw_conform::check!(suite = "generic");
//! ```
//!
//! Every check of the suite becomes its own test in a `conformance` module.
//! The project is loaded once per test process and shared by all of them.
//! Configure via `gw-conform.toml`.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use gw_conform::{Config, Runner};
//! use gw_conform::checks::Suite;
//!
//! let config = Config::default();
//! let runner = Runner::builder()
//!     .root("./geneweaver-client")
//!     .checks(Suite::All.checks(&config))
//!     .config(config)
//!     .build()?;
//!
//! let result = runner.run()?;
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use gw_conform_core::*;

// Re-export the check macro for gw_conform::check!()
pub use gw_conform_macros::check;

/// Built-in checks and suites.
pub mod checks {
    pub use gw_conform_checks::*;
}

mod runner;

#[doc(hidden)]
pub mod __internal {
    pub use crate::runner::run_check;
}
