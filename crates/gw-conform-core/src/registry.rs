//! Module registries answering "can this Python module be imported?".
//!
//! Two implementations are provided:
//!
//! - [`InterpreterRegistry`] asks a real Python interpreter (through a
//!   [`ToolRunner`]), so it sees exactly what the installed environment sees.
//! - [`SourceTreeRegistry`] resolves modules against the project's `src/`
//!   directory using PEP 420 rules, without running Python.

use crate::process::{LaunchError, ToolRunner};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What kind of object a resolved name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Directory package without `__init__.py` (PEP 420).
    Namespace,
    /// Directory package with `__init__.py`.
    Package,
    /// Single-file module.
    Module,
    /// Some other attribute value.
    Object,
}

/// Typed handle to a resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleHandle {
    /// Fully qualified module name.
    pub name: String,
    /// Kind of module.
    pub kind: ModuleKind,
    /// File the module was loaded from, if any.
    #[serde(default)]
    pub origin: Option<PathBuf>,
}

/// Result of an import attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The module was imported.
    Imported(ModuleHandle),
    /// The import failed; the reason is human readable.
    Failed(String),
}

impl ImportOutcome {
    /// Returns the handle if the import succeeded.
    #[must_use]
    pub fn handle(&self) -> Option<&ModuleHandle> {
        match self {
            Self::Imported(handle) => Some(handle),
            Self::Failed(_) => None,
        }
    }
}

/// Answers import and attribute queries for Python modules.
pub trait ModuleRegistry: Send + Sync {
    /// Imports `name`; a leading `.` makes it relative to `package`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] if the backing interpreter cannot be started.
    fn import_module(&self, name: &str, package: Option<&str>)
        -> Result<ImportOutcome, LaunchError>;

    /// Resolves the dotted attribute `path` on the imported `module`.
    ///
    /// Returns `None` when any segment of the path is missing.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] if the backing interpreter cannot be started.
    fn attribute(&self, module: &str, path: &str) -> Result<Option<ModuleHandle>, LaunchError>;
}

/// Resolves a possibly relative module name to an absolute one.
///
/// # Errors
///
/// Returns a Python-style error message when the name cannot be resolved.
pub fn resolve_name(name: &str, package: Option<&str>) -> Result<String, String> {
    let level = name.chars().take_while(|c| *c == '.').count();
    if level == 0 {
        return Ok(name.to_string());
    }
    let Some(package) = package.filter(|p| !p.is_empty()) else {
        return Err(format!(
            "the 'package' argument is required to perform a relative import for '{name}'"
        ));
    };

    let mut base: Vec<&str> = package.split('.').collect();
    if level - 1 >= base.len() {
        return Err("attempted relative import beyond top-level package".to_string());
    }
    base.truncate(base.len() - (level - 1));

    let rest = &name[level..];
    if rest.is_empty() {
        Ok(base.join("."))
    } else {
        Ok(format!("{}.{rest}", base.join(".")))
    }
}

/// Resolves modules against a source directory (usually `<root>/src`).
#[derive(Debug, Clone)]
pub struct SourceTreeRegistry {
    src: PathBuf,
}

impl SourceTreeRegistry {
    /// Creates a registry rooted at `src`.
    #[must_use]
    pub fn new(src: impl Into<PathBuf>) -> Self {
        Self { src: src.into() }
    }

    /// Creates a registry for a project root (`<root>/src`).
    #[must_use]
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join("src"))
    }

    fn resolve(&self, name: &str) -> Result<ModuleHandle, String> {
        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(format!("invalid module name '{name}'"));
        }

        let mut current = self.src.clone();
        let mut handle = None;

        for (i, segment) in segments.iter().enumerate() {
            let qualified = segments[..=i].join(".");
            if matches!(handle, Some(ModuleHandle { kind: ModuleKind::Module, .. })) {
                return Err(format!(
                    "No module named '{qualified}'; '{}' is not a package",
                    segments[..i].join(".")
                ));
            }

            let dir = current.join(segment);
            let file = current.join(format!("{segment}.py"));
            let resolved = if dir.is_dir() {
                let init = dir.join("__init__.py");
                if init.is_file() {
                    ModuleHandle {
                        name: qualified,
                        kind: ModuleKind::Package,
                        origin: Some(init),
                    }
                } else {
                    ModuleHandle {
                        name: qualified,
                        kind: ModuleKind::Namespace,
                        origin: None,
                    }
                }
            } else if file.is_file() {
                ModuleHandle {
                    name: qualified,
                    kind: ModuleKind::Module,
                    origin: Some(file),
                }
            } else {
                return Err(format!("No module named '{qualified}'"));
            };

            current = dir;
            handle = Some(resolved);
        }

        handle.ok_or_else(|| format!("invalid module name '{name}'"))
    }
}

impl ModuleRegistry for SourceTreeRegistry {
    fn import_module(
        &self,
        name: &str,
        package: Option<&str>,
    ) -> Result<ImportOutcome, LaunchError> {
        let outcome = match resolve_name(name, package).and_then(|n| self.resolve(&n)) {
            Ok(handle) => ImportOutcome::Imported(handle),
            Err(reason) => ImportOutcome::Failed(reason),
        };
        Ok(outcome)
    }

    fn attribute(&self, module: &str, path: &str) -> Result<Option<ModuleHandle>, LaunchError> {
        if self.resolve(module).is_err() {
            return Ok(None);
        }
        // Importing a submodule binds it as an attribute of its parent, so an
        // attribute path over the source tree is a chain of child modules.
        Ok(self.resolve(&format!("{module}.{path}")).ok())
    }
}

const IMPORT_SCRIPT: &str = r#"
import importlib, json, sys

def describe(obj):
    if hasattr(obj, "__path__"):
        kind = "package" if getattr(obj, "__file__", None) else "namespace"
    elif hasattr(obj, "__spec__") and hasattr(obj, "__name__"):
        kind = "module"
    else:
        kind = "object"
    return {
        "name": getattr(obj, "__name__", repr(obj)),
        "kind": kind,
        "origin": getattr(obj, "__file__", None),
    }

try:
    mode, target = sys.argv[1], sys.argv[2]
    if mode == "import":
        anchor = sys.argv[3] if len(sys.argv) > 3 else None
        result = describe(importlib.import_module(target, anchor))
    else:
        path = sys.argv[3]
        try:
            importlib.import_module(target + "." + path)
        except Exception:
            pass
        obj = importlib.import_module(target)
        for part in path.split("."):
            obj = getattr(obj, part)
        result = describe(obj)
    print(json.dumps({"ok": True, "module": result}))
except Exception as exc:
    print(json.dumps({"ok": False, "error": f"{type(exc).__name__}: {exc}"}))
"#;

#[derive(Debug, Deserialize)]
struct InterpreterAnswer {
    ok: bool,
    #[serde(default)]
    module: Option<ModuleHandle>,
    #[serde(default)]
    error: Option<String>,
}

/// Asks a Python interpreter to perform imports.
pub struct InterpreterRegistry {
    python: String,
    cwd: PathBuf,
    runner: Arc<dyn ToolRunner>,
}

impl std::fmt::Debug for InterpreterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterRegistry")
            .field("python", &self.python)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

impl InterpreterRegistry {
    /// Creates a registry that runs `python` from `cwd`.
    #[must_use]
    pub fn new(python: impl Into<String>, cwd: impl Into<PathBuf>, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            python: python.into(),
            cwd: cwd.into(),
            runner,
        }
    }

    fn ask(&self, args: &[&str]) -> Result<Result<ModuleHandle, String>, LaunchError> {
        let mut argv = vec!["-c", IMPORT_SCRIPT];
        argv.extend_from_slice(args);
        let output = self.runner.run(&self.python, &argv, &self.cwd)?;

        let answer = output
            .stdout
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with('{'))
            .and_then(|line| serde_json::from_str::<InterpreterAnswer>(line).ok());

        Ok(match answer {
            Some(InterpreterAnswer {
                ok: true,
                module: Some(handle),
                ..
            }) => Ok(handle),
            Some(answer) => Err(answer
                .error
                .unwrap_or_else(|| "interpreter returned no module".to_string())),
            None => Err(format!(
                "`{}` produced no answer (exit status {:?}): {}",
                self.python,
                output.status,
                output.stderr.trim()
            )),
        })
    }
}

impl ModuleRegistry for InterpreterRegistry {
    fn import_module(
        &self,
        name: &str,
        package: Option<&str>,
    ) -> Result<ImportOutcome, LaunchError> {
        let mut args = vec!["import", name];
        if let Some(package) = package {
            args.push(package);
        }
        Ok(match self.ask(&args)? {
            Ok(handle) => ImportOutcome::Imported(handle),
            Err(reason) => ImportOutcome::Failed(reason),
        })
    }

    fn attribute(&self, module: &str, path: &str) -> Result<Option<ModuleHandle>, LaunchError> {
        Ok(self.ask(&["attribute", module, path])?.ok())
    }
}
