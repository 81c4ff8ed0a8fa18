//! Layout checks for the repository root and the `src/geneweaver` tree.
//!
//! # Expected Layout
//!
//! ```text
//! <root>/
//!   src/geneweaver/            (namespace package, no __init__.py)
//!     [tools/]<submodule>/     (the package itself)
//!   tests/
//!   CONTRIBUTING.md
//!   README.md
//!   LICENSE
//! ```

use gw_conform_core::metadata::{PackageIdentity, NAMESPACE};
use gw_conform_core::{Category, Check, CheckError, Location, Session, Severity, Violation};
use std::path::PathBuf;

/// What kind of filesystem entry a [`RequiredPath`] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
}

/// Requires a path relative to the project root to exist.
#[derive(Debug, Clone)]
pub struct RequiredPath {
    name: &'static str,
    code: &'static str,
    description: &'static str,
    category: Category,
    path: &'static str,
    kind: PathKind,
    message: &'static str,
    severity: Severity,
}

impl RequiredPath {
    /// Creates a check for `path` with the given failure message.
    #[must_use]
    pub fn new(
        name: &'static str,
        code: &'static str,
        path: &'static str,
        kind: PathKind,
        message: &'static str,
    ) -> Self {
        Self {
            name,
            code,
            description: "",
            category: Category::Structure,
            path,
            kind,
            message,
            severity: Severity::Error,
        }
    }

    /// Sets the description shown by `list-checks`.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the category (default: structure).
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn exists(&self, session: &Session) -> bool {
        let path = session.root().join(self.path);
        match self.kind {
            PathKind::Directory => path.is_dir(),
            PathKind::File => path.is_file(),
        }
    }
}

impl Check for RequiredPath {
    fn name(&self) -> &'static str {
        self.name
    }

    fn code(&self) -> &'static str {
        self.code
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn category(&self) -> Category {
        self.category
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        if self.exists(session) {
            return Ok(Vec::new());
        }
        Ok(vec![Violation::new(
            self.code,
            self.name,
            self.severity,
            Location::new(self.path),
            self.message,
        )])
    }
}

/// GW101: `src/` directory.
#[must_use]
pub fn has_src_directory() -> RequiredPath {
    RequiredPath::new(
        "has-src-directory",
        "GW101",
        "src",
        PathKind::Directory,
        "\"src\" directory expected at root of git repository",
    )
    .description("Requires a src/ directory at the project root")
}

/// GW102: `tests/` directory.
#[must_use]
pub fn has_tests_directory() -> RequiredPath {
    RequiredPath::new(
        "has-tests-directory",
        "GW102",
        "tests",
        PathKind::Directory,
        "\"tests\" directory expected at root of git repository",
    )
    .description("Requires a tests/ directory at the project root")
}

/// GW103: `CONTRIBUTING.md` file.
#[must_use]
pub fn has_contributing_file() -> RequiredPath {
    RequiredPath::new(
        "has-contributing-file",
        "GW103",
        "CONTRIBUTING.md",
        PathKind::File,
        "CONTRIBUTING.md file not found, \
         you may need to create one at the root of your git repository",
    )
    .description("Requires a CONTRIBUTING.md file")
}

/// GW104: `README.md` file.
#[must_use]
pub fn has_readme_file() -> RequiredPath {
    RequiredPath::new(
        "has-readme-file",
        "GW104",
        "README.md",
        PathKind::File,
        "README.md file not found, \
         you may need to create one at the root of your git repository",
    )
    .description("Requires a README.md file")
}

/// GW105: `LICENSE` file.
#[must_use]
pub fn has_license_file() -> RequiredPath {
    RequiredPath::new(
        "has-license-file",
        "GW105",
        "LICENSE",
        PathKind::File,
        "LICENSE file not found, \
         you may need to create one at the root of your git repository",
    )
    .description("Requires a LICENSE file")
}

/// GW106: `src/geneweaver/` directory.
#[must_use]
pub fn has_namespace_directory() -> RequiredPath {
    RequiredPath::new(
        "has-namespace-directory",
        "GW106",
        "src/geneweaver",
        PathKind::Directory,
        "\"geneweaver\" namespace expected in \"src\" directory",
    )
    .description("Requires the geneweaver namespace directory under src/")
}

/// GW107: the namespace directory must not contain `__init__.py`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceIsImplicit;

impl Check for NamespaceIsImplicit {
    fn name(&self) -> &'static str {
        "namespace-is-implicit"
    }

    fn code(&self) -> &'static str {
        "GW107"
    }

    fn description(&self) -> &'static str {
        "Forbids __init__.py in the geneweaver namespace (PEP 420)"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let init: PathBuf = ["src", NAMESPACE, "__init__.py"].iter().collect();
        if !session.root().join(&init).is_file() {
            return Ok(Vec::new());
        }
        Ok(vec![Violation::new(
            self.code(),
            self.name(),
            self.default_severity(),
            Location::new(init),
            "\"geneweaver\" namespace is not a namespace package, \
             it should not have an __init__.py file",
        )
        .with_doc_ref("https://peps.python.org/pep-0420/")])
    }
}

/// GW108: the package directory for the derived submodule.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasPackageDirectory;

impl Check for HasPackageDirectory {
    fn name(&self) -> &'static str {
        "has-package-directory"
    }

    fn code(&self) -> &'static str {
        "GW108"
    }

    fn description(&self) -> &'static str {
        "Requires src/geneweaver/[tools/]<submodule>/"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let project = &session.project;
        let identity = match &project.identity {
            Ok(identity) => identity,
            Err(err) => {
                return Ok(vec![Violation::new(
                    self.code(),
                    self.name(),
                    self.default_severity(),
                    Location::new("pyproject.toml"),
                    format!("cannot locate the package directory: {err}"),
                )]);
            }
        };

        let namespace = PackageIdentity::namespace_path(project.is_tool_package);
        let dir: PathBuf = std::iter::once("src")
            .chain(namespace.split('.'))
            .chain(std::iter::once(identity.submodule.as_str()))
            .collect();

        if session.root().join(&dir).is_dir() {
            return Ok(Vec::new());
        }
        Ok(vec![Violation::new(
            self.code(),
            self.name(),
            self.default_severity(),
            Location::new(dir),
            format!(
                "\"{}\" package directory expected in \"geneweaver\" namespace",
                identity.submodule
            ),
        )])
    }
}
