//! Checks for the `[tool.ruff]` table of `pyproject.toml`.
//!
//! `select` and `per-file-ignores` may live in `[tool.ruff]` (legacy layout) or
//! in `[tool.ruff.lint]`. Every location present is validated, and defining a
//! setting in both is itself a violation.

use crate::pyproject::{at_key, require_pyproject};
use gw_conform_core::metadata::lookup;
use gw_conform_core::{Category, Check, CheckError, Session, Severity, Suggestion, Violation};
use std::collections::BTreeSet;
use toml::{Table, Value};

/// Rule groups every project must select, with their plugin names.
pub const REQUIRED_RULES: [(&str, &str); 14] = [
    ("F", "PyFlakes"),
    ("E", "PyCodeStyle Errors"),
    ("W", "PyCodeStyle Warnings"),
    ("A", "Builtins"),
    ("C90", "McCabe Complexity"),
    ("N", "PEP8 Naming"),
    ("B", "Bandit (security)"),
    ("ANN", "Flake8 Annotations"),
    ("D", "PyDocStyle"),
    ("I", "Isort"),
    ("ERA", "Eradicate (dead code)"),
    ("PD", "Pandas Specific Linting"),
    ("NPY", "NumPy Specific Linting"),
    ("PT", "PyTest Style"),
];

/// Per-file-ignore patterns and the rule codes each may ignore.
pub const ALLOWED_PER_FILE_IGNORES: [(&str, &[&str]); 3] = [
    ("tests/*", &["ANN001", "ANN201"]),
    (
        "src/*",
        &["ANN101", "ANN102", "ANN103", "ANN204", "ANN205", "ANN206"],
    ),
    ("src/geneweaver/api/controllers/*", &["B008"]),
];

/// Keys allowed directly under `[tool.ruff]`.
const RUFF_KEYS: [&str; 3] = ["select", "per-file-ignores", "lint"];

/// Keys allowed under `[tool.ruff.lint]`.
const RUFF_LINT_KEYS: [&str; 2] = ["select", "per-file-ignores"];

/// Message attached to every per-file-ignores error.
pub const PER_FILES_IGNORES_MSG: &str = "pyproject.toml [tool.ruff.per-file-ignores] may only \
     specify these patterns and rules:\n\
     \"tests/*\": ANN001, ANN201\n\
     \"src/*\": ANN101, ANN102, ANN103, ANN204, ANN205, ANN206\n\
     \"src/geneweaver/api/controllers/*\": B008\n\
     For tests it should look like: \n\n\
     [tool.ruff.per-file-ignores]\n\"tests/*\" = [\"ANN201\"]\n\n\
     You can optionally ignore argument type annotations in tests (`ANN001`), but it is \
     not recommended.\n";

/// Message of the warning issued when no per-file-ignores are configured.
pub const IGNORING_ALLOWED_WARN: &str = "\n\nGeneweaver allows ignoring argument and return \
     type annotations in tests.\nMost tests return nothing, and so it is not necessary to \
     specify `-> None` for every test.\nIt is recommended not to ignore argument type \
     annotations, but is allowed at the discretion of the developer.\n\n\
     To ignore return type annotations in test, add the following to you pyproject.toml \
     file:\n\n[tool.ruff.per-file-ignores]\n\"tests/*\" = [\"ANN201\"]\n\
     To ignore return and argument type annotations in test, add the following to you \
     pyproject.toml file:\n\n[tool.ruff.per-file-ignores]\n\"tests/*\" = [\"ANN001\", \
     \"ANN201\"]\n";

const RUFF_DOCS: &str = "https://docs.astral.sh/ruff/configuration/";

/// The `[tool.ruff]` snippet every project should have.
#[must_use]
pub fn expected_ruff_section() -> String {
    let codes: Vec<String> = REQUIRED_RULES
        .iter()
        .map(|(code, _)| format!("'{code}'"))
        .collect();
    format!(
        "pyproject.toml `ruff` section should look like:\n[tool.ruff]\nselect = [{}]",
        codes.join(", ")
    )
}

fn ruff_violation(check: &dyn Check, key: &str, message: impl Into<String>) -> Violation {
    at_key(check, key, message)
        .with_suggestion(Suggestion::new(expected_ruff_section()))
        .with_doc_ref(RUFF_DOCS)
}

/// Returns `[tool.ruff]`, or the violation reporting why it is unavailable.
fn require_ruff<'a>(check: &dyn Check, session: &'a Session) -> Result<&'a Table, Violation> {
    let pyproject = require_pyproject(check, session, "tool.ruff")?;
    lookup(pyproject, &["tool", "ruff"])
        .and_then(Value::as_table)
        .ok_or_else(|| {
            ruff_violation(
                check,
                "tool.ruff",
                "pyproject.toml file does not have a [tool.ruff] section",
            )
        })
}

/// Every location of `key`: `[tool.ruff]` first, then `[tool.ruff.lint]`.
///
/// Each entry is the dotted key it was found under along with the value.
fn ruff_settings<'a>(ruff: &'a Table, key: &str) -> Vec<(String, &'a Value)> {
    let top = ruff.get(key).map(|value| (format!("tool.ruff.{key}"), value));
    let lint = ruff
        .get("lint")
        .and_then(Value::as_table)
        .and_then(|lint| lint.get(key))
        .map(|value| (format!("tool.ruff.lint.{key}"), value));
    top.into_iter().chain(lint).collect()
}

/// The table part of a dotted `...select` key, e.g. `tool.ruff.lint`.
fn section_of(key: &str) -> &str {
    key.rsplit_once('.').map_or(key, |(section, _)| section)
}

/// Returns every selection with its dotted key, or the violation reporting
/// why the selection is unavailable.
fn require_selections(
    check: &dyn Check,
    session: &Session,
) -> Result<Vec<(String, BTreeSet<String>)>, Violation> {
    let ruff = require_ruff(check, session)?;
    let settings = ruff_settings(ruff, "select");
    if settings.is_empty() {
        return Err(ruff_violation(
            check,
            "tool.ruff.select",
            "pyproject.toml [tool.ruff] section missing 'select' key.",
        ));
    }

    settings
        .into_iter()
        .map(|(key, value)| {
            let codes = value
                .as_array()
                .and_then(|codes| {
                    codes
                        .iter()
                        .map(|c| c.as_str().map(str::to_string))
                        .collect::<Option<BTreeSet<_>>>()
                })
                .ok_or_else(|| {
                    ruff_violation(
                        check,
                        &key,
                        format!(
                            "pyproject.toml [{}] select = must be a list of rule codes.",
                            section_of(&key)
                        ),
                    )
                })?;
            Ok((key, codes))
        })
        .collect()
}

/// GW301: `[tool.ruff]` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasRuffSection;

impl Check for HasRuffSection {
    fn name(&self) -> &'static str {
        "has-ruff-section"
    }

    fn code(&self) -> &'static str {
        "GW301"
    }

    fn description(&self) -> &'static str {
        "Requires a [tool.ruff] table"
    }

    fn category(&self) -> Category {
        Category::Lint
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        Ok(require_ruff(self, session).err().into_iter().collect())
    }
}

/// GW302: each required rule group is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectsRequiredRules;

impl Check for SelectsRequiredRules {
    fn name(&self) -> &'static str {
        "ruff-selects-required-rules"
    }

    fn code(&self) -> &'static str {
        "GW302"
    }

    fn description(&self) -> &'static str {
        "Requires every mandatory rule group in tool.ruff select"
    }

    fn category(&self) -> Category {
        Category::Lint
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let selections = match require_selections(self, session) {
            Ok(found) => found,
            Err(v) => return Ok(vec![v]),
        };
        Ok(selections
            .iter()
            .flat_map(|(key, selected)| {
                REQUIRED_RULES
                    .iter()
                    .filter(move |(code, _)| !selected.contains(*code))
                    .map(move |(code, plugin)| {
                        ruff_violation(
                            self,
                            key,
                            format!(
                                "pyproject.toml [{}] select = section missing rule `{code}` \
                                 ({plugin}).",
                                section_of(key)
                            ),
                        )
                    })
            })
            .collect())
    }
}

/// GW303: the selection is exactly the required rule groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectIsExact;

impl Check for SelectIsExact {
    fn name(&self) -> &'static str {
        "ruff-select-is-exact"
    }

    fn code(&self) -> &'static str {
        "GW303"
    }

    fn description(&self) -> &'static str {
        "Requires tool.ruff select to equal the mandatory rule groups"
    }

    fn category(&self) -> Category {
        Category::Lint
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let selections = match require_selections(self, session) {
            Ok(found) => found,
            Err(v) => return Ok(vec![v]),
        };
        let required: BTreeSet<String> = REQUIRED_RULES
            .iter()
            .map(|(code, _)| (*code).to_string())
            .collect();

        Ok(selections
            .iter()
            .filter(|(_, selected)| *selected != required)
            .map(|(key, selected)| self.mismatch(key, selected, &required))
            .collect())
    }
}

impl SelectIsExact {
    fn mismatch(self, key: &str, selected: &BTreeSet<String>, required: &BTreeSet<String>) -> Violation {
        let extra: Vec<&str> = selected.difference(required).map(String::as_str).collect();
        let missing: Vec<&str> = required.difference(selected).map(String::as_str).collect();
        let mut message = format!(
            "pyproject.toml [{}] select = section has other specifications.",
            section_of(key)
        );
        if !extra.is_empty() {
            message.push_str(&format!(" Unexpected: {}.", extra.join(", ")));
        }
        if !missing.is_empty() {
            message.push_str(&format!(" Missing: {}.", missing.join(", ")));
        }
        ruff_violation(&self, key, message)
    }
}

/// GW304: no ruff settings beyond the selection and per-file-ignores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtraSettings;

impl NoExtraSettings {
    fn extra_keys(self, table: &Table, prefix: &str, allowed: &[&str]) -> Vec<Violation> {
        table
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .map(|key| {
                ruff_violation(
                    &self,
                    &format!("{prefix}.{key}"),
                    format!(
                        "pyproject.toml [{prefix}] section has non-standard specifications: \
                         `{key}`."
                    ),
                )
            })
            .collect()
    }
}

impl Check for NoExtraSettings {
    fn name(&self) -> &'static str {
        "ruff-has-no-extra-settings"
    }

    fn code(&self) -> &'static str {
        "GW304"
    }

    fn description(&self) -> &'static str {
        "Forbids tool.ruff settings other than select and per-file-ignores"
    }

    fn category(&self) -> Category {
        Category::Lint
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let ruff = match require_ruff(self, session) {
            Ok(ruff) => ruff,
            Err(v) => return Ok(vec![v]),
        };

        let mut violations = self.extra_keys(ruff, "tool.ruff", &RUFF_KEYS);

        match ruff.get("lint") {
            None => {}
            Some(Value::Table(lint)) => {
                violations.extend(self.extra_keys(lint, "tool.ruff.lint", &RUFF_LINT_KEYS));
                violations.extend(
                    RUFF_LINT_KEYS
                        .iter()
                        .filter(|key| ruff.contains_key(**key) && lint.contains_key(**key))
                        .map(|key| {
                            ruff_violation(
                                self,
                                &format!("tool.ruff.lint.{key}"),
                                format!(
                                    "pyproject.toml sets `{key}` in both [tool.ruff] and \
                                     [tool.ruff.lint]. Keep only one."
                                ),
                            )
                        }),
                );
            }
            Some(_) => violations.push(ruff_violation(
                self,
                "tool.ruff.lint",
                "pyproject.toml [tool.ruff] `lint` must be a table.",
            )),
        }

        Ok(violations)
    }
}

/// GW305: per-file-ignores only relax the allowed rules for the allowed paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerFileIgnores;

impl PerFileIgnores {
    fn error(self, key: &str, detail: &str) -> Violation {
        at_key(&self, key, format!("{detail}\n{PER_FILES_IGNORES_MSG}")).with_doc_ref(RUFF_DOCS)
    }

    fn check_entry(self, key: &str, pattern: &str, value: &Value) -> Vec<Violation> {
        let Some((_, allowed)) = ALLOWED_PER_FILE_IGNORES
            .iter()
            .find(|(allowed_pattern, _)| *allowed_pattern == pattern)
        else {
            return vec![self.error(
                key,
                &format!("`{pattern}` is not an allowed per-file-ignores pattern."),
            )];
        };

        let codes = value
            .as_array()
            .filter(|codes| !codes.is_empty())
            .and_then(|codes| codes.iter().map(Value::as_str).collect::<Option<Vec<_>>>());
        let Some(codes) = codes else {
            return vec![self.error(
                key,
                &format!("`{pattern}` must list at least one rule code."),
            )];
        };

        codes
            .into_iter()
            .filter(|code| !allowed.contains(code))
            .map(|code| {
                self.error(
                    key,
                    &format!("`{code}` may not be ignored for `{pattern}`."),
                )
            })
            .collect()
    }
}

impl Check for PerFileIgnores {
    fn name(&self) -> &'static str {
        "ruff-per-file-ignores"
    }

    fn code(&self) -> &'static str {
        "GW305"
    }

    fn description(&self) -> &'static str {
        "Restricts tool.ruff per-file-ignores to the allowed patterns and rules"
    }

    fn category(&self) -> Category {
        Category::Lint
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let settings = session
            .project
            .pyproject
            .as_ref()
            .and_then(|p| lookup(p, &["tool", "ruff"]))
            .and_then(Value::as_table)
            .map(|ruff| ruff_settings(ruff, "per-file-ignores"))
            .unwrap_or_default();

        let mut violations = Vec::new();
        let mut patterns = 0;
        for (key, value) in settings {
            let Value::Table(table) = value else {
                violations.push(self.error(&key, "per-file-ignores must be a table of patterns."));
                continue;
            };
            patterns += table.len();
            violations.extend(table.iter().flat_map(|(pattern, value)| {
                self.check_entry(&format!("{key}.\"{pattern}\""), pattern, value)
            }));
        }

        if patterns == 0 && violations.is_empty() {
            return Ok(vec![self.recommendation()]);
        }
        Ok(violations)
    }
}

impl PerFileIgnores {
    fn recommendation(self) -> Violation {
        let mut violation = at_key(&self, "tool.ruff.per-file-ignores", IGNORING_ALLOWED_WARN);
        violation.severity = Severity::Warning;
        violation
    }
}

/// Every `[tool.ruff]` check.
#[must_use]
pub fn ruff_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(HasRuffSection),
        Box::new(SelectsRequiredRules),
        Box::new(SelectIsExact),
        Box::new(NoExtraSettings),
        Box::new(PerFileIgnores),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_from_toml;

    const SELECT: &str =
        r#"select = ["F", "E", "W", "A", "C90", "N", "B", "ANN", "D", "I", "ERA", "PD", "NPY", "PT"]"#;

    fn run(check: &dyn Check, toml: &str) -> Vec<Violation> {
        check.run(&session_from_toml(toml)).unwrap()
    }

    #[test]
    fn expected_section_lists_codes_in_order() {
        insta::assert_snapshot!(expected_ruff_section(), @r"
        pyproject.toml `ruff` section should look like:
        [tool.ruff]
        select = ['F', 'E', 'W', 'A', 'C90', 'N', 'B', 'ANN', 'D', 'I', 'ERA', 'PD', 'NPY', 'PT']
        ");
    }

    #[test]
    fn missing_ruff_section() {
        let violations = run(&HasRuffSection, "[tool.poetry]\nname = \"geneweaver-x\"\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "GW301");

        let violations = run(&HasRuffSection, "[tool.ruff]\n");
        assert!(violations.is_empty());
    }

    #[test]
    fn exact_selection_passes_in_any_order() {
        let toml = "[tool.ruff]\nselect = [\"PT\", \"NPY\", \"PD\", \"ERA\", \"I\", \"D\", \
                    \"ANN\", \"B\", \"N\", \"C90\", \"A\", \"W\", \"E\", \"F\", \"F\"]\n";
        assert!(run(&SelectsRequiredRules, toml).is_empty());
        assert!(run(&SelectIsExact, toml).is_empty());
    }

    #[test]
    fn one_violation_per_missing_rule() {
        let toml = "[tool.ruff]\nselect = [\"F\", \"E\", \"W\"]\n";
        let violations = run(&SelectsRequiredRules, toml);
        assert_eq!(violations.len(), 11);
        assert!(violations[0].message.contains("missing rule `A` (Builtins)"));
    }

    #[test]
    fn extra_rule_breaks_exactness() {
        let toml = format!("[tool.ruff]\n{}\n", SELECT.replace("\"PT\"", "\"PT\", \"UP\""));
        assert!(run(&SelectsRequiredRules, &toml).is_empty());
        let violations = run(&SelectIsExact, &toml);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.ends_with("Unexpected: UP."));
    }

    #[test]
    fn selection_read_from_lint_table() {
        let toml = format!("[tool.ruff.lint]\n{SELECT}\n");
        assert!(run(&SelectIsExact, &toml).is_empty());
        assert!(run(&NoExtraSettings, &toml).is_empty());
    }

    #[test]
    fn missing_select_key() {
        let violations = run(&SelectIsExact, "[tool.ruff]\nline-length = 88\n");
        assert_eq!(
            violations[0].message,
            "pyproject.toml [tool.ruff] section missing 'select' key."
        );
    }

    #[test]
    fn extra_settings_are_reported_per_key() {
        let toml = format!(
            "[tool.ruff]\n{SELECT}\nline-length = 88\n\n[tool.ruff.lint]\nignore = [\"E501\"]\n"
        );
        let violations = run(&NoExtraSettings, &toml);
        let keys: Vec<_> = violations
            .iter()
            .filter_map(|v| v.location.key.as_deref())
            .collect();
        assert_eq!(keys, vec!["tool.ruff.line-length", "tool.ruff.lint.ignore"]);
    }

    #[test]
    fn allowed_per_file_ignore_passes() {
        let toml = "[tool.ruff.per-file-ignores]\n\"tests/*\" = [\"ANN201\"]\n";
        assert!(run(&PerFileIgnores, toml).is_empty());

        let toml = "[tool.ruff.lint.per-file-ignores]\n\"tests/*\" = [\"ANN001\", \"ANN201\"]\n\
                    \"src/*\" = [\"ANN101\"]\n\"src/geneweaver/api/controllers/*\" = [\"B008\"]\n";
        assert!(run(&PerFileIgnores, toml).is_empty());
    }

    #[test]
    fn unknown_code_fails_with_standard_message() {
        let toml = "[tool.ruff.per-file-ignores]\n\"tests/*\" = [\"ANN999\"]\n";
        let violations = run(&PerFileIgnores, toml);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
        assert!(violations[0].message.contains("`ANN999` may not be ignored"));
        assert!(violations[0].message.ends_with(PER_FILES_IGNORES_MSG));
    }

    #[test]
    fn unknown_pattern_and_empty_list_fail() {
        let toml = "[tool.ruff.per-file-ignores]\n\"docs/*\" = [\"D100\"]\n\"tests/*\" = []\n";
        let violations = run(&PerFileIgnores, toml);
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.severity == Severity::Error && v.message.contains(PER_FILES_IGNORES_MSG)));
    }

    #[test]
    fn absent_or_empty_ignores_only_warn() {
        for toml in [
            "[tool.ruff]\n",
            "[tool.ruff.per-file-ignores]\n",
            "[tool.poetry]\n",
        ] {
            let violations = run(&PerFileIgnores, toml);
            assert_eq!(violations.len(), 1, "{toml}");
            assert_eq!(violations[0].severity, Severity::Warning);
            assert_eq!(violations[0].message, IGNORING_ALLOWED_WARN);
        }
    }

    #[test]
    fn each_pattern_has_its_own_allow_list() {
        let cases = [
            ("src/*", "ANN001"),
            ("src/geneweaver/api/controllers/*", "ANN201"),
            ("tests/*", "B008"),
        ];
        for (pattern, code) in cases {
            let toml = format!("[tool.ruff.per-file-ignores]\n\"{pattern}\" = [\"{code}\"]\n");
            let violations = run(&PerFileIgnores, &toml);
            assert_eq!(violations.len(), 1, "{pattern}");
            assert!(violations[0]
                .message
                .contains(&format!("`{code}` may not be ignored for `{pattern}`")));
        }
    }

    #[test]
    fn both_per_file_ignores_tables_are_validated() {
        let toml = "[tool.ruff.per-file-ignores]\n\"tests/*\" = [\"ANN201\"]\n\n\
                    [tool.ruff.lint.per-file-ignores]\n\"docs/*\" = [\"E501\"]\n\
                    \"tests/*\" = [\"ALL\"]\n";
        let violations = run(&PerFileIgnores, toml);
        let keys: Vec<_> = violations
            .iter()
            .filter_map(|v| v.location.key.as_deref())
            .collect();
        assert_eq!(
            keys,
            vec![
                "tool.ruff.lint.per-file-ignores.\"docs/*\"",
                "tool.ruff.lint.per-file-ignores.\"tests/*\"",
            ]
        );
        assert!(violations.iter().all(|v| v.severity == Severity::Error));

        let duplicated = run(&NoExtraSettings, toml);
        assert_eq!(duplicated.len(), 1);
        assert_eq!(
            duplicated[0].location.key.as_deref(),
            Some("tool.ruff.lint.per-file-ignores")
        );
    }

    #[test]
    fn lint_selection_cannot_hide_behind_legacy_selection() {
        let toml = format!("[tool.ruff]\n{SELECT}\n\n[tool.ruff.lint]\nselect = [\"ALL\"]\n");

        let exact = run(&SelectIsExact, &toml);
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].location.key.as_deref(), Some("tool.ruff.lint.select"));
        assert!(exact[0].message.starts_with(
            "pyproject.toml [tool.ruff.lint] select = section has other specifications. \
             Unexpected: ALL."
        ));

        let missing = run(&SelectsRequiredRules, &toml);
        assert_eq!(missing.len(), REQUIRED_RULES.len());
        assert!(missing
            .iter()
            .all(|v| v.location.key.as_deref() == Some("tool.ruff.lint.select")));

        let duplicated = run(&NoExtraSettings, &toml);
        assert_eq!(duplicated.len(), 1);
        assert!(duplicated[0]
            .message
            .contains("sets `select` in both [tool.ruff] and [tool.ruff.lint]"));
    }

    #[test]
    fn standard_message_lists_every_allowed_pattern() {
        for (pattern, codes) in ALLOWED_PER_FILE_IGNORES {
            let line = format!("\"{pattern}\": {}", codes.join(", "));
            assert!(PER_FILES_IGNORES_MSG.contains(&line), "{line}");
        }
    }

    #[test]
    fn per_file_ignores_not_a_table() {
        let violations = run(&PerFileIgnores, "[tool.ruff]\nper-file-ignores = \"tests/*\"\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
    }
}
