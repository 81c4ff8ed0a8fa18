//! Session context shared by every check.

use crate::config::{Config, ImportMode};
use crate::metadata::{self, IdentityError, PackageIdentity, ProjectError};
use crate::process::{SystemToolRunner, ToolRunner};
use crate::registry::{InterpreterRegistry, ModuleRegistry, SourceTreeRegistry};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use toml::Table;

/// File name of the build configuration.
pub const PYPROJECT_FILE: &str = "pyproject.toml";

/// Paths derived from the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Root of the project's source tree.
    pub root: PathBuf,
    /// `<root>/pyproject.toml`.
    pub pyproject_path: PathBuf,
    /// `<root>/.git`.
    pub git_dir: PathBuf,
}

impl ProjectLayout {
    /// Derives the layout from a root directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pyproject_path: root.join(PYPROJECT_FILE),
            git_dir: root.join(".git"),
            root,
        }
    }
}

/// Facts about the checked project, computed once per session.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Derived paths.
    pub layout: ProjectLayout,
    /// Parsed `pyproject.toml`, `None` if the file does not exist.
    pub pyproject: Option<Table>,
    /// Package identity, or why it could not be derived.
    pub identity: Result<PackageIdentity, IdentityError>,
    /// Whether the project is a tool package.
    pub is_tool_package: bool,
}

impl ProjectContext {
    /// Loads the context for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `pyproject.toml` exists but cannot be read or parsed.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let layout = ProjectLayout::new(root);
        let pyproject = metadata::load_pyproject(&layout.pyproject_path)?;
        Ok(Self::from_parts(layout, pyproject))
    }

    /// Builds a context from an already parsed pyproject.
    #[must_use]
    pub fn from_parts(layout: ProjectLayout, pyproject: Option<Table>) -> Self {
        let identity = pyproject
            .as_ref()
            .ok_or(IdentityError::NoPyproject)
            .and_then(PackageIdentity::from_pyproject);
        let is_tool_package = metadata::is_tool_package(&layout.root);

        Self {
            layout,
            pyproject,
            identity,
            is_tool_package,
        }
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    /// Returns the declared package name, if any.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.identity.as_ref().ok().map(|i| i.name.as_str())
    }

    /// Returns the derived submodule name, if any.
    #[must_use]
    pub fn submodule_name(&self) -> Option<&str> {
        self.identity.as_ref().ok().map(|i| i.submodule.as_str())
    }
}

/// Everything a check may look at: the project plus the process and module seams.
///
/// Built once and shared read-only by all checks of a run.
pub struct Session {
    /// The checked project.
    pub project: ProjectContext,
    /// Runs external tools.
    pub tools: Arc<dyn ToolRunner>,
    /// Answers import queries.
    pub modules: Arc<dyn ModuleRegistry>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session, choosing the module registry from `config.imports`.
    #[must_use]
    pub fn new(project: ProjectContext, config: &Config, tools: Arc<dyn ToolRunner>) -> Self {
        let modules: Arc<dyn ModuleRegistry> = match config.imports.mode {
            ImportMode::Interpreter => Arc::new(InterpreterRegistry::new(
                config.imports.python.clone(),
                project.root().to_path_buf(),
                Arc::clone(&tools),
            )),
            ImportMode::Source => Arc::new(SourceTreeRegistry::for_project(project.root())),
        };
        Self {
            project,
            tools,
            modules,
        }
    }

    /// Loads the project at `root` and wires the system tool runner.
    ///
    /// # Errors
    ///
    /// Returns an error if `pyproject.toml` exists but cannot be parsed.
    pub fn open(root: impl Into<PathBuf>, config: &Config) -> Result<Self, ProjectError> {
        let project = ProjectContext::load(root)?;
        Ok(Self::new(project, config, Arc::new(SystemToolRunner)))
    }

    /// Replaces the module registry.
    #[must_use]
    pub fn with_modules(mut self, modules: Arc<dyn ModuleRegistry>) -> Self {
        self.modules = modules;
        self
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.project.root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn layout_derives_paths() {
        let layout = ProjectLayout::new("/work/pkg");
        assert_eq!(layout.pyproject_path, PathBuf::from("/work/pkg/pyproject.toml"));
        assert_eq!(layout.git_dir, PathBuf::from("/work/pkg/.git"));
    }

    #[test]
    fn load_without_pyproject() {
        let tmp = TempDir::new().unwrap();
        let ctx = ProjectContext::load(tmp.path()).unwrap();
        assert!(ctx.pyproject.is_none());
        assert_eq!(ctx.identity, Err(IdentityError::NoPyproject));
        assert_eq!(ctx.package_name(), None);
        assert!(!ctx.is_tool_package);
    }

    #[test]
    fn load_with_pyproject_and_tools_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(PYPROJECT_FILE),
            "[tool.poetry]\nname = \"geneweaver-aon\"\n",
        )
        .unwrap();
        fs::create_dir_all(tmp.path().join("src/geneweaver/tools")).unwrap();

        let ctx = ProjectContext::load(tmp.path()).unwrap();
        assert_eq!(ctx.package_name(), Some("geneweaver-aon"));
        assert_eq!(ctx.submodule_name(), Some("aon"));
        assert!(ctx.is_tool_package);
    }

    #[test]
    fn malformed_pyproject_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(PYPROJECT_FILE), "name = [").unwrap();
        assert!(ProjectContext::load(tmp.path()).is_err());
    }
}
