//! Internal runner for `check!()` macro integration.
//!
//! This module is `#[doc(hidden)]` and not part of the public API.
//! It is called by the test functions generated by `gw_conform::check!()`.

use gw_conform_checks::{all_checks, Suite};
use gw_conform_core::{Config, Runner, Session, Severity, PYPROJECT_FILE};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::debug;

/// Config file names to search for, in priority order.
const CONFIG_CANDIDATES: &[&str] = &["gw-conform.toml", ".gw-conform.toml"];

/// Configuration and session shared by every generated test of one process.
struct Prepared {
    config: Config,
    session: Arc<Session>,
}

/// Cache key: the manifest directory plus the explicit config path, if any.
type CacheKey = (PathBuf, Option<String>);

fn sessions() -> &'static Mutex<HashMap<CacheKey, Arc<Prepared>>> {
    static SESSIONS: OnceLock<Mutex<HashMap<CacheKey, Arc<Prepared>>>> = OnceLock::new();
    SESSIONS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Runs one convention check as part of `cargo test`.
///
/// Called by the `check!()` macro-generated test functions.
///
/// # Panics
///
/// Panics with a formatted report if the check finds violations at or above
/// `fail_on`, or if the project cannot be loaded.
pub fn run_check(
    check_name: &str,
    suite: Option<&str>,
    config_path: Option<&str>,
    fail_on: Option<&str>,
) {
    let prepared = prepare(config_path);
    let config = &prepared.config;

    let effective_suite = resolve_suite(suite, config);
    if !effective_suite.check_names().contains(&check_name) {
        debug!("{check_name} is not part of suite {effective_suite}, skipping");
        return;
    }
    let effective_fail_on = resolve_fail_on(fail_on, config);

    let Some(check) = all_checks(config)
        .into_iter()
        .find(|c| c.name() == check_name)
    else {
        panic!("gw-conform: unknown check `{check_name}`");
    };

    let runner = Runner::builder()
        .root(prepared.session.root())
        .config(config.clone())
        .check_box(check)
        .build()
        .unwrap_or_else(|e| panic!("gw-conform: failed to build runner: {e}"));

    let result = runner
        .run_with(&prepared.session)
        .unwrap_or_else(|e| panic!("gw-conform: {check_name} could not run: {e}"));

    if result.has_violations_at(effective_fail_on) {
        let report = result.format_test_report(effective_fail_on);
        panic!("{report}");
    }
}

/// Returns the cached configuration and session, building them on first use.
fn prepare(config_path: Option<&str>) -> Arc<Prepared> {
    let manifest_dir = manifest_dir();
    let key = (manifest_dir.clone(), config_path.map(str::to_string));

    let mut cache = sessions().lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(prepared) = cache.get(&key) {
        return Arc::clone(prepared);
    }

    let config = load_config(&manifest_dir, config_path);
    let root = match &config {
        Some(config) => config.project.root.clone(),
        None => find_project_root(&manifest_dir),
    };
    let config = config.unwrap_or_default();
    debug!("Opening session for {}", root.display());

    let session = Session::open(&root, &config)
        .unwrap_or_else(|e| panic!("gw-conform: failed to load project at {}: {e}", root.display()));

    let prepared = Arc::new(Prepared {
        config,
        session: Arc::new(session),
    });
    cache.insert(key, Arc::clone(&prepared));
    prepared
}

/// The directory of the crate running the tests.
fn manifest_dir() -> PathBuf {
    std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Loads the explicit config file, or the first candidate found walking up
/// from `start`.
fn load_config(start: &Path, explicit_path: Option<&str>) -> Option<Config> {
    let path = match explicit_path {
        Some(path) if Path::new(path).is_absolute() => PathBuf::from(path),
        Some(path) => start.join(path),
        None => find_config(start)?,
    };
    debug!("Using config {}", path.display());
    Some(Config::from_file(&path).unwrap_or_else(|e| panic!("gw-conform: {e}")))
}

/// Finds a config candidate in `start` or one of its ancestors.
fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

/// Finds the project root: the nearest ancestor of `start` holding
/// `pyproject.toml` or `.git`, or `start` itself.
fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(PYPROJECT_FILE).is_file() || dir.join(".git").exists())
        .unwrap_or(start)
        .to_path_buf()
}

/// Resolves the effective suite from macro arg > config > default.
fn resolve_suite(macro_arg: Option<&str>, config: &Config) -> Suite {
    let name = macro_arg.or(config.suite.as_deref()).unwrap_or("all");
    Suite::from_name(name).unwrap_or_else(|| {
        panic!("gw-conform: unknown suite `{name}`. Valid suites: generic, package, style, all")
    })
}

/// Resolves the effective `fail_on` severity from macro arg > config > default.
///
/// Priority: explicit macro arg > config file > default ("error").
fn resolve_fail_on(macro_arg: Option<&str>, config: &Config) -> Severity {
    let name = macro_arg.or(config.fail_on.as_deref()).unwrap_or("error");
    Severity::from_name(name).unwrap_or_else(|| {
        panic!("gw-conform: unknown severity `{name}`. Valid values: error, warning, info")
    })
}
