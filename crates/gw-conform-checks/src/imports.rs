//! Checks that the package can be imported the ways consumers import it.

use gw_conform_core::metadata::{PackageIdentity, NAMESPACE};
use gw_conform_core::registry::ImportOutcome;
use gw_conform_core::{Category, Check, CheckError, Location, Session, Violation};
use tracing::debug;

/// Message shared by every import failure.
pub const ERROR_MESSAGE: &str = "The package is not importable. Review available test traceback \
     to identify the cause. If you are unable to identify the cause from the traceback, we \
     recommend opening a python terminal and attempting to import the package manually.";

/// Which import an [`ImportCheck`] attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportQuery {
    /// `import geneweaver[.tools].<submodule>`.
    Absolute,
    /// `import_module(".<submodule>", "geneweaver[.tools]")`.
    Relative,
    /// `import geneweaver`.
    Namespace,
    /// `geneweaver.[tools.]<submodule>` reachable as an attribute chain.
    ExposedByNamespace,
}

/// Asks the session's module registry to perform one import.
#[derive(Debug, Clone, Copy)]
pub struct ImportCheck {
    query: ImportQuery,
}

impl ImportCheck {
    /// Creates the check for `query`.
    #[must_use]
    pub fn new(query: ImportQuery) -> Self {
        Self { query }
    }

    fn violation(&self, reason: &str) -> Violation {
        Violation::new(
            self.code(),
            self.name(),
            self.default_severity(),
            Location::new("src"),
            format!("{ERROR_MESSAGE}\n{reason}"),
        )
    }

    fn launch(&self, err: gw_conform_core::process::LaunchError) -> CheckError {
        CheckError::launch(self.name(), err)
    }

    /// Returns the failure reason, or `None` if the import works.
    fn attempt(
        &self,
        session: &Session,
        identity: Option<&PackageIdentity>,
    ) -> Result<Option<String>, CheckError> {
        let is_tool = session.project.is_tool_package;
        let modules = &session.modules;
        let anchor = PackageIdentity::namespace_path(is_tool);

        let outcome = match (self.query, identity) {
            (ImportQuery::Namespace, _) => modules.import_module(NAMESPACE, None),
            (ImportQuery::Absolute, Some(identity)) => {
                modules.import_module(&identity.qualified(is_tool), None)
            }
            (ImportQuery::Relative, Some(identity)) => {
                modules.import_module(&format!(".{}", identity.submodule), Some(&anchor))
            }
            (ImportQuery::ExposedByNamespace, Some(identity)) => {
                if let ImportOutcome::Failed(reason) = modules
                    .import_module(&identity.qualified(is_tool), None)
                    .map_err(|e| self.launch(e))?
                {
                    return Ok(Some(reason));
                }
                let path = match identity.qualified(is_tool).split_once('.') {
                    Some((_, path)) => path.to_string(),
                    None => identity.submodule.clone(),
                };
                let found = modules
                    .attribute(NAMESPACE, &path)
                    .map_err(|e| self.launch(e))?;
                return Ok(match found {
                    Some(handle) => {
                        debug!("{} resolved to {:?}", path, handle.kind);
                        None
                    }
                    None => Some(format!("module '{NAMESPACE}' has no attribute '{path}'")),
                });
            }
            (_, None) => return Ok(Some("the package name could not be determined".to_string())),
        };

        Ok(match outcome.map_err(|e| self.launch(e))? {
            ImportOutcome::Imported(handle) => {
                debug!("Imported {} ({:?})", handle.name, handle.kind);
                None
            }
            ImportOutcome::Failed(reason) => Some(reason),
        })
    }
}

impl Check for ImportCheck {
    fn name(&self) -> &'static str {
        match self.query {
            ImportQuery::Absolute => "can-import-absolute",
            ImportQuery::Relative => "can-import-relative",
            ImportQuery::Namespace => "can-import-namespace",
            ImportQuery::ExposedByNamespace => "submodule-exposed-by-namespace",
        }
    }

    fn code(&self) -> &'static str {
        match self.query {
            ImportQuery::Absolute => "GW501",
            ImportQuery::Relative => "GW502",
            ImportQuery::Namespace => "GW503",
            ImportQuery::ExposedByNamespace => "GW504",
        }
    }

    fn description(&self) -> &'static str {
        match self.query {
            ImportQuery::Absolute => "Requires the package to import by its absolute name",
            ImportQuery::Relative => "Requires the package to import relative to its namespace",
            ImportQuery::Namespace => "Requires the geneweaver namespace to import",
            ImportQuery::ExposedByNamespace => {
                "Requires the package to be reachable as an attribute of geneweaver"
            }
        }
    }

    fn category(&self) -> Category {
        Category::Imports
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let identity = match (&session.project.identity, self.query) {
            (_, ImportQuery::Namespace) => None,
            (Ok(identity), _) => Some(identity),
            (Err(err), _) => return Ok(vec![self.violation(&err.to_string())]),
        };
        Ok(self
            .attempt(session, identity)?
            .map(|reason| self.violation(&reason))
            .into_iter()
            .collect())
    }
}

/// Every import check.
#[must_use]
pub fn import_checks() -> Vec<Box<dyn Check>> {
    [
        ImportQuery::Absolute,
        ImportQuery::Relative,
        ImportQuery::Namespace,
        ImportQuery::ExposedByNamespace,
    ]
    .into_iter()
    .map(|q| Box::new(ImportCheck::new(q)) as Box<dyn Check>)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_at;
    use gw_conform_core::registry::SourceTreeRegistry;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn project(name: &str, package_dir: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("pyproject.toml"),
            format!("[tool.poetry]\nname = \"{name}\"\n"),
        )
        .unwrap();
        let dir = tmp.path().join("src").join(package_dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__init__.py"), "").unwrap();
        tmp
    }

    fn run_all(root: &Path) -> Vec<Violation> {
        let session =
            session_at(root).with_modules(Arc::new(SourceTreeRegistry::for_project(root)));
        import_checks()
            .iter()
            .flat_map(|c| c.run(&session).unwrap())
            .collect()
    }

    #[test]
    fn importable_package_passes() {
        let tmp = project("geneweaver-client", "geneweaver/client");
        assert!(run_all(tmp.path()).is_empty());
    }

    #[test]
    fn tool_package_passes() {
        let tmp = project("geneweaver-boolean-algebra", "geneweaver/tools/boolean_algebra");
        assert!(run_all(tmp.path()).is_empty());
    }

    #[test]
    fn missing_package_fails_all_but_namespace() {
        let tmp = project("geneweaver-client", "geneweaver/other");
        let codes: Vec<_> = run_all(tmp.path()).into_iter().map(|v| v.code).collect();
        assert_eq!(codes, vec!["GW501", "GW502", "GW504"]);
    }

    #[test]
    fn failure_message_appends_reason() {
        let tmp = project("geneweaver-client", "geneweaver/other");
        let violations = run_all(tmp.path());
        assert!(violations[0].message.starts_with(ERROR_MESSAGE));
        assert!(violations[0]
            .message
            .ends_with("No module named 'geneweaver.client'"));
    }

    #[test]
    fn missing_identity_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/geneweaver")).unwrap();
        let violations = run_all(tmp.path());
        let codes: Vec<_> = violations.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["GW501", "GW502", "GW504"]);
        assert!(violations[0].message.contains("pyproject.toml not found"));
    }
}
