//! Checks that shell out to the formatter, the import sorter and other tools.

use gw_conform_core::process::ToolOutput;
use gw_conform_core::{
    Category, Check, CheckError, Config, Location, Session, Suggestion, Violation,
};

/// Runs `<program> <flag> <dir>` and requires a zero exit status.
#[derive(Debug, Clone)]
pub struct ToolCheck {
    name: &'static str,
    code: &'static str,
    description: &'static str,
    program: String,
    flag: &'static str,
    dir: &'static str,
    label: String,
}

impl ToolCheck {
    /// Creates a check running `program flag dir` from the project root.
    ///
    /// `label` names the tool in failure messages (e.g. "black formatting").
    #[must_use]
    pub fn new(
        name: &'static str,
        code: &'static str,
        program: impl Into<String>,
        flag: &'static str,
        dir: &'static str,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name,
            code,
            description: "",
            program: program.into(),
            flag,
            dir,
            label: label.into(),
        }
    }

    /// Sets the description shown by `list-checks`.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Returns the program this check runs.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn failure(&self, output: &ToolOutput) -> Violation {
        let message = format!(
            "{} failed on {} directory \n{}{}Run '{} {}' to fix formatting.",
            self.label, self.dir, output.stdout, output.stderr, self.program, self.dir
        );
        Violation::new(
            self.code,
            self.name,
            self.default_severity(),
            Location::new(self.dir),
            message,
        )
        .with_suggestion(Suggestion::new(format!(
            "run `{} {}`",
            self.program, self.dir
        )))
    }
}

impl Check for ToolCheck {
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
        Category::Style
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let output = session
            .tools
            .run(&self.program, &[self.flag, self.dir], session.root())
            .map_err(|e| CheckError::launch(self.name, e))?;

        if output.succeeded() {
            return Ok(Vec::new());
        }
        Ok(vec![self.failure(&output)])
    }
}

/// Every configured tool must answer `--version`.
#[derive(Debug, Clone)]
pub struct RequiredToolsAvailable {
    tools: Vec<String>,
}

impl RequiredToolsAvailable {
    /// Creates the check for the given tool names.
    #[must_use]
    pub fn new(tools: Vec<String>) -> Self {
        Self { tools }
    }
}

impl Default for RequiredToolsAvailable {
    fn default() -> Self {
        Self::new(Config::default().tools.required)
    }
}

impl Check for RequiredToolsAvailable {
    fn name(&self) -> &'static str {
        "required-tools-available"
    }

    fn code(&self) -> &'static str {
        "GW405"
    }

    fn description(&self) -> &'static str {
        "Requires the development tools to be installed"
    }

    fn category(&self) -> Category {
        Category::Style
    }

    fn run(&self, session: &Session) -> Result<Vec<Violation>, CheckError> {
        let mut violations = Vec::new();
        for tool in &self.tools {
            let problem = match session.tools.run(tool, &["--version"], session.root()) {
                Ok(output) if output.succeeded() => continue,
                Ok(output) => format!(
                    "`{tool} --version` exited with status {}\n{}{}",
                    output
                        .status
                        .map_or_else(|| "signal".to_string(), |s| s.to_string()),
                    output.stdout,
                    output.stderr
                ),
                Err(e) => e.to_string(),
            };
            violations.push(
                Violation::new(
                    self.code(),
                    self.name(),
                    self.default_severity(),
                    Location::new("."),
                    format!("required tool `{tool}` is not available: {problem}"),
                )
                .with_suggestion(Suggestion::new(format!(
                    "add `{tool}` to the development dependencies and install them"
                ))),
            );
        }
        Ok(violations)
    }
}

/// Every style check, with tool names taken from `config`.
#[must_use]
pub fn style_checks(config: &Config) -> Vec<Box<dyn Check>> {
    let formatter = &config.tools.formatter;
    let sorter = &config.tools.import_sorter;
    let formatting = format!("{formatter} formatting");
    let sorting = format!("{sorter} import sorting");
    vec![
        Box::new(
            ToolCheck::new(
                "formatter-src",
                "GW401",
                formatter,
                "--check",
                "src",
                formatting.clone(),
            )
            .description("Requires src/ to pass the formatter check"),
        ),
        Box::new(
            ToolCheck::new(
                "formatter-tests",
                "GW402",
                formatter,
                "--check",
                "tests",
                formatting,
            )
            .description("Requires tests/ to pass the formatter check"),
        ),
        Box::new(
            ToolCheck::new(
                "import-sorter-src",
                "GW403",
                sorter,
                "--check-only",
                "src",
                sorting.clone(),
            )
            .description("Requires imports in src/ to be sorted"),
        ),
        Box::new(
            ToolCheck::new(
                "import-sorter-tests",
                "GW404",
                sorter,
                "--check-only",
                "tests",
                sorting,
            )
            .description("Requires imports in tests/ to be sorted"),
        ),
        Box::new(RequiredToolsAvailable::new(config.tools.required.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{session_with_tools, ScriptedTools};
    use gw_conform_core::Severity;

    fn black_src() -> ToolCheck {
        ToolCheck::new("formatter-src", "GW401", "black", "--check", "src", "black formatting")
    }

    #[test]
    fn passing_tool_has_no_violations() {
        let tools = ScriptedTools::new().answer("black --check src", ToolOutput::success(""));
        let session = session_with_tools(tools.clone());

        assert!(black_src().run(&session).unwrap().is_empty());
        assert_eq!(tools.calls(), vec!["black --check src"]);
    }

    #[test]
    fn failing_tool_embeds_output_and_fix_hint() {
        let tools = ScriptedTools::new().answer(
            "black --check src",
            ToolOutput::failure(1, "would reformat src/x.py\n", "Oh no!\n"),
        );
        let session = session_with_tools(tools);

        let violations = black_src().run(&session).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "black formatting failed on src directory \nwould reformat src/x.py\nOh no!\n\
             Run 'black src' to fix formatting."
        );
    }

    #[test]
    fn missing_formatter_is_fatal() {
        let session = session_with_tools(ScriptedTools::new());
        let err = black_src().run(&session).unwrap_err();
        assert!(matches!(err, CheckError::ToolLaunch { .. }));
    }

    #[test]
    fn configured_tools_are_used() {
        let mut config = Config::default();
        config.tools.import_sorter = "ruff-isort".to_string();
        let checks = style_checks(&config);
        let sorter = checks.iter().find(|c| c.code() == "GW404").unwrap();

        let tools = ScriptedTools::new()
            .answer("ruff-isort --check-only tests", ToolOutput::success(""));
        let session = session_with_tools(tools.clone());
        assert!(sorter.run(&session).unwrap().is_empty());
        assert_eq!(tools.calls(), vec!["ruff-isort --check-only tests"]);
    }

    #[test]
    fn failure_message_names_the_configured_formatter() {
        let mut config = Config::default();
        config.tools.formatter = "ruff-format".to_string();
        let checks = style_checks(&config);
        let formatter = checks.iter().find(|c| c.code() == "GW401").unwrap();

        let tools = ScriptedTools::new().answer(
            "ruff-format --check src",
            ToolOutput::failure(1, "1 file would be reformatted\n", ""),
        );
        let violations = formatter.run(&session_with_tools(tools)).unwrap();
        assert_eq!(violations.len(), 1);
        assert!(violations[0]
            .message
            .starts_with("ruff-format formatting failed on src directory"));
        assert!(!violations[0].message.contains("Black"));
    }

    #[test]
    fn missing_required_tool_is_a_violation() {
        let tools = ScriptedTools::new()
            .answer("ruff --version", ToolOutput::success("ruff 0.4.0"))
            .answer("mypy --version", ToolOutput::failure(2, "", "broken install"));
        let session = session_with_tools(tools);

        let violations = RequiredToolsAvailable::default().run(&session).unwrap();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("`mypy --version` exited with status 2"));
        assert!(violations[1].message.contains("failed to launch `pytest`"));
        assert!(violations.iter().all(|v| v.severity == Severity::Error));
    }
}
