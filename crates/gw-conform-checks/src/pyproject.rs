//! Checks for the `[tool.poetry]` and `[build-system]` tables of `pyproject.toml`.

use crate::structure::{PathKind, RequiredPath};
use gw_conform_core::metadata::{lookup_table, NAMESPACE};
use gw_conform_core::{
    Category, Check, CheckError, Location, Session, Suggestion, Violation, PYPROJECT_FILE,
};
use toml::{Table, Value};

/// Pointer to the Poetry documentation attached to every metadata violation.
pub const POETRY_ERROR_MESSAGE: &str =
    "see https://python-poetry.org/docs/ for information on getting started with Python Poetry";

const PACKAGES_FROM_SRC_MESSAGE: &str = "all packages must be defined in the `src` directory, \
     see https://python-poetry.org/docs/pyproject/#packages for more information.";

const PACKAGES_NAMESPACE_MESSAGE: &str = "all Geneweaver packages must be located in the \
     `geneweaver` namespace package. See https://peps.python.org/pep-0420/ for more information.";

const BUILD_SYSTEM_MESSAGE: &str = "pyproject.toml file does not have a complete \
     [build-system] section";

const BUILD_SYSTEM_DOCS: &str = "https://python-poetry.org/docs/pyproject/#poetry-and-pep-517";

/// Builds a violation located at `key` inside `pyproject.toml`.
pub(crate) fn at_key(check: &dyn Check, key: &str, message: impl Into<String>) -> Violation {
    Violation::new(
        check.code(),
        check.name(),
        check.default_severity(),
        Location::key(PYPROJECT_FILE, key),
        message,
    )
}

/// Like [`at_key`], with the Poetry getting-started pointer as suggestion.
fn poetry_violation(check: &dyn Check, key: &str, message: impl Into<String>) -> Violation {
    at_key(check, key, message).with_suggestion(Suggestion::new(POETRY_ERROR_MESSAGE))
}

/// Returns the parsed pyproject, or the violation reporting that it is missing.
pub(crate) fn require_pyproject<'a>(
    check: &dyn Check,
    session: &'a Session,
    section: &str,
) -> Result<&'a Table, Violation> {
    session.project.pyproject.as_ref().ok_or_else(|| {
        poetry_violation(
            check,
            section,
            format!("pyproject.toml file not found, the [{section}] section cannot be checked"),
        )
    })
}

/// Returns `[tool.poetry]`, or the violation reporting why it is unavailable.
fn require_poetry<'a>(check: &dyn Check, session: &'a Session) -> Result<&'a Table, Violation> {
    let pyproject = require_pyproject(check, session, "tool.poetry")?;
    lookup_table(pyproject, &["tool", "poetry"]).ok_or_else(|| {
        poetry_violation(
            check,
            "tool.poetry",
            format!(
                "pyproject.toml file does not have a [tool.poetry] section, {POETRY_ERROR_MESSAGE}"
            ),
        )
    })
}

/// Collapses a `Result<Vec<_>, Violation>` into the list a check returns.
fn flatten(result: Result<Vec<Violation>, Violation>) -> Vec<Violation> {
    result.unwrap_or_else(|v| vec![v])
}

/// GW201: `pyproject.toml` file.
#[must_use]
pub fn has_pyproject_toml() -> RequiredPath {
    RequiredPath::new(
        "has-pyproject-toml",
        "GW201",
        PYPROJECT_FILE,
        PathKind::File,
        "pyproject.toml file not found, you may need to create one at the root of your git \
         repository. see https://python-poetry.org/docs/ for information on getting started \
         with Python Poetry",
    )
    .category(Category::Metadata)
    .description("Requires a pyproject.toml file")
}

/// GW202: `[tool.poetry]` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasToolPoetrySection;

impl Check for HasToolPoetrySection {
    fn name(&self) -> &'static str {
        "has-tool-poetry-section"
    }

    fn code(&self) -> &'static str {
        "GW202"
    }

    fn description(&self) -> &'static str {
        "Requires a [tool.poetry] table"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        Ok(flatten(require_poetry(self, session).map(|_| Vec::new())))
    }
}

/// What a [`PoetryField`] requires of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// A non-empty string.
    NonEmptyString,
    /// A non-empty array.
    NonEmptyArray,
    /// Exactly this string.
    Equals(&'static str),
}

/// Requires a key of `[tool.poetry]` to be present and well-formed.
#[derive(Debug, Clone)]
pub struct PoetryField {
    name: &'static str,
    code: &'static str,
    description: &'static str,
    field: &'static str,
    requirement: Requirement,
    missing: &'static str,
    empty: &'static str,
    mismatch: Option<&'static str>,
}

impl PoetryField {
    /// Creates a field check.
    ///
    /// `missing` is reported when the key is absent, `empty` when the value is
    /// empty or of the wrong type.
    #[must_use]
    pub fn new(
        name: &'static str,
        code: &'static str,
        field: &'static str,
        requirement: Requirement,
        missing: &'static str,
        empty: &'static str,
    ) -> Self {
        Self {
            name,
            code,
            description: "",
            field,
            requirement,
            missing,
            empty,
            mismatch: None,
        }
    }

    /// Sets the message for a non-empty value that is not the expected one.
    #[must_use]
    pub fn mismatch(mut self, message: &'static str) -> Self {
        self.mismatch = Some(message);
        self
    }

    /// Sets the description shown by `list-checks`.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    fn evaluate(&self, value: Option<&Value>) -> Option<&'static str> {
        let Some(value) = value else {
            return Some(self.missing);
        };
        match self.requirement {
            Requirement::NonEmptyString => match value.as_str() {
                Some(s) if !s.is_empty() => None,
                _ => Some(self.empty),
            },
            Requirement::NonEmptyArray => match value.as_array() {
                Some(a) if !a.is_empty() => None,
                _ => Some(self.empty),
            },
            Requirement::Equals(expected) => match value.as_str() {
                Some(s) if s == expected => None,
                Some(s) if !s.is_empty() => Some(self.mismatch.unwrap_or(self.empty)),
                _ => Some(self.empty),
            },
        }
    }
}

impl Check for PoetryField {
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
        Category::Metadata
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let result = require_poetry(self, session).map(|poetry| {
            self.evaluate(poetry.get(self.field))
                .map(|message| {
                    poetry_violation(self, &format!("tool.poetry.{}", self.field), message)
                })
                .into_iter()
                .collect()
        });
        Ok(flatten(result))
    }
}

/// GW203: `name`.
#[must_use]
pub fn poetry_has_name() -> PoetryField {
    PoetryField::new(
        "poetry-has-name",
        "GW203",
        "name",
        Requirement::NonEmptyString,
        "You need to define the package name as `name = ` \
         in the [tool.poetry] section of the pyproject.toml file",
        "pyproject.toml file does not have a value for name in the [tool.poetry] section",
    )
    .description("Requires tool.poetry.name")
}

/// GW204: `version`.
#[must_use]
pub fn poetry_has_version() -> PoetryField {
    PoetryField::new(
        "poetry-has-version",
        "GW204",
        "version",
        Requirement::NonEmptyString,
        "pyproject.toml file does not have a version in the [tool.poetry] section",
        "pyproject.toml file does not have a value for version in the [tool.poetry] section",
    )
    .description("Requires tool.poetry.version")
}

/// GW205: `description`.
#[must_use]
pub fn poetry_has_description() -> PoetryField {
    PoetryField::new(
        "poetry-has-description",
        "GW205",
        "description",
        Requirement::NonEmptyString,
        "pyproject.toml file does not have a description set in the [tool.poetry] section",
        "pyproject.toml file does not have a value for description in the [tool.poetry] section",
    )
    .description("Requires a non-empty tool.poetry.description")
}

/// GW206: `authors`.
#[must_use]
pub fn poetry_has_authors() -> PoetryField {
    PoetryField::new(
        "poetry-has-authors",
        "GW206",
        "authors",
        Requirement::NonEmptyArray,
        "pyproject.toml file does not have an authors section",
        "pyproject.toml file does not have any authors listed",
    )
    .description("Requires at least one entry in tool.poetry.authors")
}

/// GW207: `license = "Apache-2.0"`.
#[must_use]
pub fn poetry_has_license() -> PoetryField {
    PoetryField::new(
        "poetry-has-license",
        "GW207",
        "license",
        Requirement::Equals("Apache-2.0"),
        "pyproject.toml file does not have a license section",
        "pyproject.toml file does not have a value for the license",
    )
    .mismatch("license in pyproject.toml file must be set to Apache-2.0")
    .description("Requires tool.poetry.license to be Apache-2.0")
}

/// GW208: `readme = "README.md"`.
#[must_use]
pub fn poetry_has_readme() -> PoetryField {
    PoetryField::new(
        "poetry-has-readme",
        "GW208",
        "readme",
        Requirement::Equals("README.md"),
        "pyproject.toml file does not have a readme section",
        "readme in pyproject.toml file must be \"README.md\"",
    )
    .description("Requires tool.poetry.readme to be README.md")
}

/// GW209: `packages`.
#[must_use]
pub fn poetry_has_packages() -> PoetryField {
    PoetryField::new(
        "poetry-has-packages",
        "GW209",
        "packages",
        Requirement::NonEmptyArray,
        "pyproject.toml file does not have a packages section",
        "pyproject.toml file does not have any packages listed",
    )
    .description("Requires at least one entry in tool.poetry.packages")
}

/// GW210: `homepage`.
#[must_use]
pub fn poetry_has_homepage() -> PoetryField {
    PoetryField::new(
        "poetry-has-homepage",
        "GW210",
        "homepage",
        Requirement::NonEmptyString,
        "pyproject.toml file does not have a homepage section",
        "pyproject.toml file does not have a value for the homepage",
    )
    .description("Requires tool.poetry.homepage")
}

/// GW211: `repository`.
#[must_use]
pub fn poetry_has_repository() -> PoetryField {
    PoetryField::new(
        "poetry-has-repository",
        "GW211",
        "repository",
        Requirement::NonEmptyString,
        "pyproject.toml file does not have a repository section",
        "pyproject.toml file does not have a value for the repository",
    )
    .description("Requires tool.poetry.repository")
}

/// Iterates `tool.poetry.packages` entries, reporting a missing array.
fn packages<'a>(
    check: &dyn Check,
    session: &'a Session,
) -> Result<Vec<(String, &'a Value)>, Violation> {
    let poetry = require_poetry(check, session)?;
    let packages = poetry
        .get("packages")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            poetry_violation(
                check,
                "tool.poetry.packages",
                "pyproject.toml file does not have a packages section",
            )
        })?;
    Ok(packages
        .iter()
        .enumerate()
        .map(|(i, p)| (format!("tool.poetry.packages[{i}]"), p))
        .collect())
}

/// GW212: every package entry is declared `from = "src"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagesFromSrc;

impl Check for PackagesFromSrc {
    fn name(&self) -> &'static str {
        "packages-from-src"
    }

    fn code(&self) -> &'static str {
        "GW212"
    }

    fn description(&self) -> &'static str {
        "Requires every tool.poetry.packages entry to use from = \"src\""
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let result = packages(self, session).map(|entries| {
            entries
                .into_iter()
                .filter_map(|(key, package)| {
                    match package.get("from").map(Value::as_str) {
                        None => Some(poetry_violation(
                            self,
                            &key,
                            format!(
                                "pyproject.toml file does not have a `from` definition for a \
                                 package. {PACKAGES_FROM_SRC_MESSAGE}"
                            ),
                        )),
                        Some(Some("src")) => None,
                        Some(_) => Some(poetry_violation(
                            self,
                            &format!("{key}.from"),
                            PACKAGES_FROM_SRC_MESSAGE,
                        )),
                    }
                })
                .collect()
        });
        Ok(flatten(result))
    }
}

/// GW213: every package entry is included under the namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagesInNamespace;

impl Check for PackagesInNamespace {
    fn name(&self) -> &'static str {
        "packages-in-namespace"
    }

    fn code(&self) -> &'static str {
        "GW213"
    }

    fn description(&self) -> &'static str {
        "Requires every tool.poetry.packages include to live under geneweaver/"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let result = packages(self, session).map(|entries| {
            entries
                .into_iter()
                .filter_map(|(key, package)| {
                    match package.get("include").map(Value::as_str) {
                        None | Some(None) => Some(poetry_violation(
                            self,
                            &key,
                            "pyproject.toml file does not have an `include` definition for a \
                             package.",
                        )),
                        Some(Some(include)) if include.split('/').next() == Some(NAMESPACE) => {
                            None
                        }
                        Some(Some(_)) => Some(
                            poetry_violation(
                                self,
                                &format!("{key}.include"),
                                PACKAGES_NAMESPACE_MESSAGE,
                            )
                            .with_doc_ref("https://peps.python.org/pep-0420/"),
                        ),
                    }
                })
                .collect()
        });
        Ok(flatten(result))
    }
}

/// GW214: `[build-system]` uses poetry-core and the configured backend.
#[derive(Debug, Clone)]
pub struct BuildSystem {
    backend: String,
}

impl Default for BuildSystem {
    fn default() -> Self {
        Self::new("poetry.masonry.api")
    }
}

impl BuildSystem {
    /// Creates the check for the given literal `build-backend`.
    #[must_use]
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
        }
    }

    fn violation(&self, key: &str, detail: &str) -> Violation {
        poetry_violation(self, key, format!("{BUILD_SYSTEM_MESSAGE}: {detail}"))
            .with_doc_ref(BUILD_SYSTEM_DOCS)
    }
}

impl Check for BuildSystem {
    fn name(&self) -> &'static str {
        "build-system-is-poetry"
    }

    fn code(&self) -> &'static str {
        "GW214"
    }

    fn description(&self) -> &'static str {
        "Requires [build-system] to use poetry-core"
    }

    fn category(&self) -> Category {
        Category::Metadata
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let pyproject = match require_pyproject(self, session, "build-system") {
            Ok(pyproject) => pyproject,
            Err(v) => return Ok(vec![v]),
        };
        let Some(build) = lookup_table(pyproject, &["build-system"]) else {
            return Ok(vec![self.violation("build-system", "the table is missing")]);
        };

        let mut violations = Vec::new();

        let requires_ok = build
            .get("requires")
            .and_then(Value::as_array)
            .is_some_and(|r| r.len() == 1 && r[0].as_str() == Some("poetry-core"));
        if !requires_ok {
            violations.push(self.violation(
                "build-system.requires",
                "`requires` must be [\"poetry-core\"]",
            ));
        }

        if build.get("build-backend").and_then(Value::as_str) != Some(self.backend.as_str()) {
            violations.push(self.violation(
                "build-system.build-backend",
                &format!("`build-backend` must be \"{}\"", self.backend),
            ));
        }

        Ok(violations)
    }
}

/// Every metadata check of `[tool.poetry]` and `[build-system]` for `backend`.
#[must_use]
pub fn poetry_checks(backend: &str) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(has_pyproject_toml()),
        Box::new(HasToolPoetrySection),
        Box::new(poetry_has_name()),
        Box::new(poetry_has_version()),
        Box::new(poetry_has_description()),
        Box::new(poetry_has_authors()),
        Box::new(poetry_has_license()),
        Box::new(poetry_has_readme()),
        Box::new(poetry_has_packages()),
        Box::new(poetry_has_homepage()),
        Box::new(poetry_has_repository()),
        Box::new(PackagesFromSrc),
        Box::new(PackagesInNamespace),
        Box::new(BuildSystem::new(backend)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_from_toml;
    use gw_conform_core::Severity;

    fn errors(violations: &[Violation]) -> usize {
        violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    const VALID: &str = r#"
[tool.poetry]
name = "geneweaver-widgets"
version = "0.1.0"
description = "Widgets for GeneWeaver"
authors = ["Jax Computational Sciences <cssc@jax.org>"]
license = "Apache-2.0"
readme = "README.md"
homepage = "https://geneweaver.org"
repository = "https://github.com/TheJacksonLaboratory/geneweaver-widgets"
packages = [{ include = "geneweaver/widgets", from = "src" }]

[build-system]
requires = ["poetry-core"]
build-backend = "poetry.masonry.api"
"#;

    fn run_all(toml: &str) -> Vec<Violation> {
        let session = session_from_toml(toml);
        poetry_checks("poetry.masonry.api")
            .iter()
            .flat_map(|c| c.run(&session).unwrap())
            .filter(|v| v.code != "GW201")
            .collect()
    }

    #[test]
    fn minimal_valid_mapping_passes_every_metadata_check() {
        let violations = run_all(VALID);
        assert!(violations.is_empty(), "{violations:#?}");
    }

    #[test]
    fn license_must_be_apache() {
        let toml = VALID.replace("Apache-2.0", "MIT");
        let violations = run_all(&toml);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "GW207");
        assert_eq!(
            violations[0].message,
            "license in pyproject.toml file must be set to Apache-2.0"
        );
        assert_eq!(
            violations[0].suggestion.as_ref().map(|s| s.message.as_str()),
            Some(POETRY_ERROR_MESSAGE)
        );
    }

    #[test]
    fn empty_license_has_dedicated_message() {
        let toml = VALID.replace("\"Apache-2.0\"", "\"\"");
        let violations = run_all(&toml);
        assert_eq!(
            violations[0].message,
            "pyproject.toml file does not have a value for the license"
        );
    }

    #[test]
    fn readme_must_be_exact() {
        let toml = VALID.replace("readme = \"README.md\"", "readme = \"README.rst\"");
        let violations = run_all(&toml);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "readme in pyproject.toml file must be \"README.md\""
        );
    }

    #[test]
    fn empty_authors_and_missing_homepage() {
        let toml = VALID
            .replace(
                "authors = [\"Jax Computational Sciences <cssc@jax.org>\"]",
                "authors = []",
            )
            .replace("homepage = \"https://geneweaver.org\"\n", "");
        let codes: Vec<_> = run_all(&toml).into_iter().map(|v| v.code).collect();
        assert_eq!(codes, vec!["GW206", "GW210"]);
    }

    #[test]
    fn packages_outside_src_and_namespace() {
        let toml = VALID.replace(
            "packages = [{ include = \"geneweaver/widgets\", from = \"src\" }]",
            "packages = [{ include = \"widgets\", from = \"lib\" }, { include = \"geneweaver/x\" }]",
        );
        let violations = run_all(&toml);
        let codes: Vec<_> = violations.iter().map(|v| v.code.as_str()).collect();
        assert_eq!(codes, vec!["GW212", "GW212", "GW213"]);
        assert_eq!(
            violations[0].location.key.as_deref(),
            Some("tool.poetry.packages[0].from")
        );
        assert!(violations[1]
            .message
            .starts_with("pyproject.toml file does not have a `from` definition"));
    }

    #[test]
    fn build_system_requires_list_and_backend_literal() {
        let toml = VALID.replace("requires = [\"poetry-core\"]", "requires = \"poetry-core\"");
        let violations = run_all(&toml);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.key.as_deref(), Some("build-system.requires"));

        let toml = VALID.replace("poetry.masonry.api", "poetry.core.masonry.api");
        let violations = run_all(&toml);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].location.key.as_deref(),
            Some("build-system.build-backend")
        );

        let session = session_from_toml(&toml);
        let check = BuildSystem::new("poetry.core.masonry.api");
        assert!(check.run(&session).unwrap().is_empty());
    }

    #[test]
    fn build_system_rejects_extra_requirements() {
        let toml = VALID.replace(
            "requires = [\"poetry-core\"]",
            "requires = [\"poetry-core\", \"setuptools\"]",
        );
        assert_eq!(errors(&run_all(&toml)), 1);
    }

    #[test]
    fn missing_poetry_section_reported_by_each_check() {
        let violations = run_all("[build-system]\nrequires = [\"poetry-core\"]\n");
        let poetry_section = violations
            .iter()
            .filter(|v| v.message.contains("does not have a [tool.poetry] section"))
            .count();
        // GW202-GW213
        assert_eq!(poetry_section, 12);
    }
}
