//! gw-conform CLI tool.
//!
//! Usage:
//! ```bash
//! gw-conform check [OPTIONS] [PATH]
//! gw-conform list-checks
//! gw-conform init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use gw_conform_checks::Suite;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Convention checker for GeneWeaver Python projects
#[derive(Parser)]
#[command(name = "gw-conform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run convention checks
    Check {
        /// Project to check (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Suite to run: generic, package, style or all (default: from config, else all)
        #[arg(short, long, value_parser = parse_suite)]
        suite: Option<Suite>,

        /// Only run checks matching these names, codes or globs (comma-separated)
        #[arg(long)]
        checks: Option<String>,

        /// Skip checks matching a name, code or glob (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available checks
    ListChecks,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Graphical diagnostics rendered by miette.
    Fancy,
}

fn parse_suite(name: &str) -> Result<Suite, String> {
    Suite::from_name(name)
        .ok_or_else(|| format!("unknown suite `{name}` (expected generic, package, style or all)"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            suite,
            checks,
            exclude,
        } => {
            let source =
                config_resolver::ConfigResolver::from_env().resolve(&path, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                format,
                suite,
                only: commands::check::split_patterns(checks.as_deref()),
                exclude,
            };
            let failed = commands::check::run(&path, &options, &source)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListChecks => {
            commands::list_checks::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(std::path::Path::new("."), force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_arguments_parse() {
        let cli = Cli::try_parse_from([
            "gw-conform",
            "check",
            "../geneweaver-client",
            "--format",
            "compact",
            "--suite",
            "generic",
            "--checks",
            "GW2*,has-src-directory",
            "-e",
            "GW214",
        ])
        .unwrap();

        let Commands::Check {
            path,
            format,
            suite,
            checks,
            exclude,
        } = cli.command
        else {
            panic!("expected check command");
        };
        assert_eq!(path, PathBuf::from("../geneweaver-client"));
        assert_eq!(format, OutputFormat::Compact);
        assert_eq!(suite, Some(Suite::Generic));
        assert_eq!(checks.as_deref(), Some("GW2*,has-src-directory"));
        assert_eq!(exclude, vec!["GW214".to_string()]);
    }

    #[test]
    fn unknown_suite_is_rejected() {
        let result = Cli::try_parse_from(["gw-conform", "check", "--suite", "strict"]);
        assert!(result.is_err());
    }
}
