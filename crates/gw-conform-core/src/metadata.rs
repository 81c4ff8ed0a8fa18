//! Reading `pyproject.toml` and deriving package facts from it.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::{Table, Value};

/// Name of the shared namespace package every project lives under.
pub const NAMESPACE: &str = "geneweaver";

/// Sub-namespace used by tool packages.
pub const TOOLS_NAMESPACE: &str = "tools";

/// Errors loading the project's build configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    /// The file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(gw_conform::project::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file is not valid TOML.
    #[error("Failed to parse {path}: {message}")]
    #[diagnostic(
        code(gw_conform::project::parse),
        help("fix the TOML syntax error before running convention checks")
    )]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },
}

/// Why a package identity could not be derived.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum IdentityError {
    /// There is no `pyproject.toml` to derive it from.
    #[error("pyproject.toml not found, the package name cannot be determined")]
    #[diagnostic(code(gw_conform::identity::no_pyproject))]
    NoPyproject,

    /// `tool.poetry.name` is missing or not a string.
    #[error("`tool.poetry.name` is not set in pyproject.toml")]
    #[diagnostic(code(gw_conform::identity::missing_name))]
    MissingName,

    /// The name has no segment after the namespace prefix.
    #[error("package name `{name}` has no submodule part after the `geneweaver-` prefix")]
    #[diagnostic(
        code(gw_conform::identity::no_submodule),
        help("package names look like `geneweaver-<submodule>`")
    )]
    NoSubmodule {
        /// The declared package name.
        name: String,
    },
}

/// The declared package name and the derived submodule name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    /// Full declared name (e.g. `geneweaver-client`).
    pub name: String,
    /// Submodule name under the namespace (e.g. `client`).
    pub submodule: String,
}

impl PackageIdentity {
    /// Derives the identity from a parsed pyproject.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is missing or has no submodule part.
    pub fn from_pyproject(pyproject: &Table) -> Result<Self, IdentityError> {
        let name = package_name(pyproject)?;
        let submodule = submodule_name(name).ok_or_else(|| IdentityError::NoSubmodule {
            name: name.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            submodule,
        })
    }

    /// Dotted path of the package that holds the submodule.
    #[must_use]
    pub fn namespace_path(is_tool: bool) -> String {
        if is_tool {
            format!("{NAMESPACE}.{TOOLS_NAMESPACE}")
        } else {
            NAMESPACE.to_string()
        }
    }

    /// Fully qualified dotted module path of the submodule.
    #[must_use]
    pub fn qualified(&self, is_tool: bool) -> String {
        format!("{}.{}", Self::namespace_path(is_tool), self.submodule)
    }
}

/// Reads and parses a `pyproject.toml` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn read_pyproject(path: &Path) -> Result<Table, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|e| ProjectError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    content.parse::<Table>().map_err(|e| ProjectError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Loads `pyproject.toml` if it exists.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_pyproject(path: &Path) -> Result<Option<Table>, ProjectError> {
    if !path.is_file() {
        tracing::debug!("No pyproject.toml at {}", path.display());
        return Ok(None);
    }
    read_pyproject(path).map(Some)
}

/// Returns the declared package name, `tool.poetry.name`.
///
/// # Errors
///
/// Returns [`IdentityError::MissingName`] if any of the nested keys is missing.
pub fn package_name(pyproject: &Table) -> Result<&str, IdentityError> {
    lookup(pyproject, &["tool", "poetry", "name"])
        .and_then(Value::as_str)
        .ok_or(IdentityError::MissingName)
}

/// Derives the submodule name from a full package name.
///
/// Drops the first `-` separated segment and joins the rest with `_`,
/// so `geneweaver-client-tools` becomes `client_tools`.
#[must_use]
pub fn submodule_name(full_name: &str) -> Option<String> {
    let rest: Vec<&str> = full_name.split('-').skip(1).collect();
    let joined = rest.join("_");
    if joined.trim_matches('_').is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Returns true if the project is a tool package (`src/geneweaver/tools` exists).
#[must_use]
pub fn is_tool_package(root: &Path) -> bool {
    root.join("src")
        .join(NAMESPACE)
        .join(TOOLS_NAMESPACE)
        .is_dir()
}

/// Walks nested tables along `keys`.
#[must_use]
pub fn lookup<'a>(table: &'a Table, keys: &[&str]) -> Option<&'a Value> {
    let (last, parents) = keys.split_last()?;
    let mut current = table;
    for key in parents {
        current = current.get(*key)?.as_table()?;
    }
    current.get(*last)
}

/// Like [`lookup`], but only returns tables.
#[must_use]
pub fn lookup_table<'a>(table: &'a Table, keys: &[&str]) -> Option<&'a Table> {
    lookup(table, keys).and_then(Value::as_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> Table {
        content.parse().unwrap()
    }

    #[test]
    fn submodule_joins_all_but_first_segment() {
        assert_eq!(submodule_name("geneweaver-client").as_deref(), Some("client"));
        assert_eq!(
            submodule_name("geneweaver-client-tools").as_deref(),
            Some("client_tools")
        );
    }

    #[test]
    fn submodule_is_none_without_suffix() {
        assert_eq!(submodule_name("geneweaver"), None);
        assert_eq!(submodule_name("geneweaver-"), None);
    }

    #[test]
    fn package_name_reads_tool_poetry_name() {
        let table = parse("[tool.poetry]\nname = \"geneweaver-widgets\"\n");
        assert_eq!(package_name(&table), Ok("geneweaver-widgets"));
    }

    #[test]
    fn package_name_missing_is_lookup_error() {
        let table = parse("[tool.ruff]\nselect = []\n");
        assert_eq!(package_name(&table), Err(IdentityError::MissingName));
    }

    #[test]
    fn identity_paths() {
        let table = parse("[tool.poetry]\nname = \"geneweaver-widgets\"\n");
        let identity = PackageIdentity::from_pyproject(&table).unwrap();
        assert_eq!(identity.submodule, "widgets");
        assert_eq!(identity.qualified(false), "geneweaver.widgets");
        assert_eq!(identity.qualified(true), "geneweaver.tools.widgets");
    }

    #[test]
    fn identity_without_submodule_is_error() {
        let table = parse("[tool.poetry]\nname = \"geneweaver\"\n");
        assert!(matches!(
            PackageIdentity::from_pyproject(&table),
            Err(IdentityError::NoSubmodule { .. })
        ));
    }

    #[test]
    fn load_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let loaded = load_pyproject(&tmp.path().join("pyproject.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pyproject.toml");
        std::fs::write(&path, "[tool.poetry\nname = ").unwrap();
        assert!(matches!(
            load_pyproject(&path),
            Err(ProjectError::Parse { .. })
        ));
    }

    #[test]
    fn tool_package_detection() {
        let tmp = TempDir::new().unwrap();
        assert!(!is_tool_package(tmp.path()));
        std::fs::create_dir_all(tmp.path().join("src/geneweaver/tools")).unwrap();
        assert!(is_tool_package(tmp.path()));
    }

    #[test]
    fn lookup_walks_nested_tables() {
        let table = parse("[tool.ruff.lint]\nselect = [\"F\"]\n");
        assert!(lookup(&table, &["tool", "ruff", "lint", "select"]).is_some());
        assert!(lookup(&table, &["tool", "poetry", "name"]).is_none());
        assert!(lookup_table(&table, &["tool", "ruff"]).is_some());
    }
}
