//! # gw-conform-checks
//!
//! Built-in convention checks for GeneWeaver Python projects.
//!
//! ## Available Checks
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | GW101 | `has-src-directory` | `src/` exists |
//! | GW102 | `has-tests-directory` | `tests/` exists |
//! | GW103 | `has-contributing-file` | `CONTRIBUTING.md` exists |
//! | GW104 | `has-readme-file` | `README.md` exists |
//! | GW105 | `has-license-file` | `LICENSE` exists |
//! | GW106 | `has-namespace-directory` | `src/geneweaver/` exists |
//! | GW107 | `namespace-is-implicit` | no `src/geneweaver/__init__.py` |
//! | GW108 | `has-package-directory` | `src/geneweaver/[tools/]<submodule>/` exists |
//! | GW201 | `has-pyproject-toml` | `pyproject.toml` exists |
//! | GW202 | `has-tool-poetry-section` | `[tool.poetry]` exists |
//! | GW203-GW211 | `poetry-has-*` | name, version, description, authors, license, readme, packages, homepage, repository |
//! | GW212 | `packages-from-src` | packages declared `from = "src"` |
//! | GW213 | `packages-in-namespace` | packages included under `geneweaver/` |
//! | GW214 | `build-system-is-poetry` | `[build-system]` uses poetry-core |
//! | GW301-GW305 | `ruff-*` | `[tool.ruff]` selection, extra settings and per-file-ignores |
//! | GW401-GW404 | `formatter-*`, `import-sorter-*` | formatter and import sorter pass on `src/` and `tests/` |
//! | GW405 | `required-tools-available` | development tools answer `--version` |
//! | GW501-GW504 | `can-import-*`, `submodule-exposed-by-namespace` | the package is importable |
//!
//! ## Usage
//!
//! ```ignore
//! use gw_conform_checks::Suite;
//! use gw_conform_core::{Config, Runner};
//!
//! let config = Config::default();
//! let runner = Runner::builder()
//!     .root("./geneweaver-client")
//!     .checks(Suite::Generic.checks(&config))
//!     .config(config)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod imports;
pub mod pyproject;
pub mod ruff;
pub mod structure;
pub mod style;
mod suites;

#[cfg(test)]
mod testing;

pub use imports::{ImportCheck, ImportQuery};
pub use pyproject::{BuildSystem, PackagesFromSrc, PackagesInNamespace, PoetryField, Requirement};
pub use ruff::{HasRuffSection, NoExtraSettings, PerFileIgnores, SelectIsExact, SelectsRequiredRules};
pub use structure::{HasPackageDirectory, NamespaceIsImplicit, PathKind, RequiredPath};
pub use style::{RequiredToolsAvailable, ToolCheck};
pub use suites::{all_checks, generic_checks, package_checks, Suite};
