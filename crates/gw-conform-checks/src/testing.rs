//! Session builders and a scripted tool runner for unit tests.

use gw_conform_core::process::{LaunchError, ToolOutput, ToolRunner};
use gw_conform_core::{Config, ProjectContext, ProjectLayout, Session};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Answers tool invocations from a table keyed by the full command line.
///
/// Unknown commands fail to launch, like a missing executable.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTools {
    answers: Arc<Mutex<HashMap<String, ToolOutput>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTools {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn answer(self, command: &str, output: ToolOutput) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(command.to_string(), output);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToolRunner for ScriptedTools {
    fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<ToolOutput, LaunchError> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(command.clone());
        self.answers
            .lock()
            .unwrap()
            .get(&command)
            .cloned()
            .ok_or_else(|| LaunchError {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

/// Loads the project at `root` with a tool runner that knows no commands.
pub(crate) fn session_at(root: &Path) -> Session {
    let project = ProjectContext::load(root).unwrap();
    Session::new(project, &Config::default(), Arc::new(ScriptedTools::new()))
}

/// An in-memory project with the given pyproject contents.
pub(crate) fn session_from_toml(toml: &str) -> Session {
    let layout = ProjectLayout::new(std::env::temp_dir().join("gw-conform-in-memory"));
    let project = ProjectContext::from_parts(layout, Some(toml.parse().unwrap()));
    Session::new(project, &Config::default(), Arc::new(ScriptedTools::new()))
}

/// An in-memory project without pyproject, using `tools` for subprocesses.
pub(crate) fn session_with_tools(tools: ScriptedTools) -> Session {
    let layout = ProjectLayout::new(std::env::temp_dir());
    let project = ProjectContext::from_parts(layout, None);
    Session::new(project, &Config::default(), Arc::new(tools))
}
