//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "gw-conform.toml";

const DEFAULT_CONFIG: &str = r#"# gw-conform configuration

# Suite to run: generic, package, style or all
suite = "all"

# Lowest severity that fails a run: error, warning or info
fail_on = "error"

[project]
# Project root, relative to this file
root = "."

[tools]
formatter = "black"
import_sorter = "isort"
required = ["ruff", "mypy", "pytest"]

[imports]
# "interpreter" imports the package with Python, "source" inspects src/
mode = "interpreter"
python = "python3"

[build_system]
backend = "poetry.masonry.api"

# Each check can be disabled or have its severity overridden
# [checks.has-contributing-file]
# enabled = false
#
# [checks.ruff-per-file-ignores]
# severity = "info"
"#;

/// Runs the init command, writing the config file into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure checks");
    println!("  2. Run: gw-conform check");

    Ok(())
}
