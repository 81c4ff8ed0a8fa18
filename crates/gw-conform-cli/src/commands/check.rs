//! Check command implementation.

use anyhow::{bail, Context, Result};
use gw_conform_checks::Suite;
use gw_conform_core::{Config, Runner, Severity};
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options of the check command.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Suite override; falls back to the config, then `all`.
    pub suite: Option<Suite>,
    /// Name, code or glob patterns selecting checks.
    pub only: Vec<String>,
    /// Name, code or glob patterns skipping checks.
    pub exclude: Vec<String>,
}

/// Splits a comma-separated `--checks` value into patterns.
#[must_use]
pub fn split_patterns(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Runs the check command.
///
/// Returns `true` when the project has violations at or above the
/// configured `fail_on` severity.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<bool> {
    let config = source.load()?;
    let suite = resolve_suite(options.suite, &config)?;
    let fail_on = match config.fail_on.as_deref() {
        Some(name) => Severity::from_name(name)
            .with_context(|| format!("Unknown fail_on severity in config: {name}"))?,
        None => Severity::Error,
    };

    let mut builder = Runner::builder()
        .root(path)
        .checks(suite.checks(&config))
        .config(config);
    for pattern in &options.only {
        builder = builder.only(pattern.as_str());
    }
    for pattern in &options.exclude {
        builder = builder.exclude(pattern.as_str());
    }

    let runner = builder.build().context("Failed to build runner")?;

    tracing::info!(
        "Checking {} with {} checks from suite {suite}",
        runner.root().display(),
        runner.check_count()
    );

    let result = runner
        .run()
        .with_context(|| format!("Checking {} failed", runner.root().display()))?;

    super::output::print(&result, options.format)?;

    Ok(result.has_violations_at(fail_on))
}

fn resolve_suite(flag: Option<Suite>, config: &Config) -> Result<Suite> {
    if let Some(suite) = flag {
        return Ok(suite);
    }
    match config.suite.as_deref() {
        Some(name) => match Suite::from_name(name) {
            Some(suite) => Ok(suite),
            None => bail!("Unknown suite in config: {name}"),
        },
        None => Ok(Suite::All),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn split_patterns_trims_and_drops_empty() {
        assert_eq!(
            split_patterns(Some(" GW1*, poetry-has-name ,,")),
            vec!["GW1*".to_string(), "poetry-has-name".to_string()]
        );
        assert!(split_patterns(None).is_empty());
    }

    #[test]
    fn suite_flag_overrides_config() {
        let config = Config::parse("suite = \"style\"").unwrap();
        assert_eq!(resolve_suite(Some(Suite::Generic), &config).unwrap(), Suite::Generic);
        assert_eq!(resolve_suite(None, &config).unwrap(), Suite::Style);
        assert_eq!(resolve_suite(None, &Config::default()).unwrap(), Suite::All);
    }

    #[test]
    fn unknown_suite_in_config_is_an_error() {
        let config = Config::parse("suite = \"strict\"").unwrap();
        let err = resolve_suite(None, &config).unwrap_err();
        assert!(err.to_string().contains("strict"));
    }

    #[test]
    fn empty_directory_fails_structure_checks() {
        let tmp = TempDir::new().unwrap();
        let options = CheckOptions {
            format: OutputFormat::Compact,
            only: vec!["GW10[1-5]".to_string()],
            ..CheckOptions::default()
        };
        let failed = run(tmp.path(), &options, &ConfigSource::Default).unwrap();
        assert!(failed);
    }

    #[test]
    fn disabled_checks_in_project_config_are_skipped() {
        let tmp = TempDir::new().unwrap();
        for dir in ["src", "tests"] {
            fs::create_dir(tmp.path().join(dir)).unwrap();
        }
        let config = tmp.path().join("gw-conform.toml");
        fs::write(
            &config,
            "[checks.has-contributing-file]\nenabled = false\n\
             [checks.has-readme-file]\nseverity = \"warning\"\n\
             [checks.has-license-file]\nseverity = \"info\"\n",
        )
        .unwrap();

        let options = CheckOptions {
            format: OutputFormat::Json,
            only: vec!["GW10[1-5]".to_string()],
            ..CheckOptions::default()
        };
        let failed = run(tmp.path(), &options, &ConfigSource::Project(config)).unwrap();
        assert!(!failed);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let source = ConfigSource::Explicit(tmp.path().join("missing.toml"));
        let err = run(tmp.path(), &CheckOptions::default(), &source).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
