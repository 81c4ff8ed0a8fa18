//! List checks command implementation.

use gw_conform_checks::{all_checks, Suite};
use gw_conform_core::Config;

/// Runs the list-checks command.
pub fn run() {
    print!("{}", render());
}

fn render() -> String {
    use std::fmt::Write;

    let config = Config::default();
    let mut out = String::from("Available checks:\n\n");
    let _ = writeln!(
        out,
        "{:<7} {:<36} {:<8} {:<10} Description",
        "Code", "Name", "Suite", "Category"
    );
    let _ = writeln!(out, "{}", "-".repeat(110));

    for check in all_checks(&config) {
        let suite = [Suite::Generic, Suite::Package, Suite::Style]
            .into_iter()
            .find(|s| s.check_names().contains(&check.name()))
            .map_or("", Suite::name);
        let _ = writeln!(
            out,
            "{:<7} {:<36} {:<8} {:<10} {}",
            check.code(),
            check.name(),
            suite,
            check.category().to_string(),
            check.description()
        );
    }

    out.push_str("\nSuites:\n");
    out.push_str("  generic  - GW101-GW105, GW201-GW212, GW214, GW301-GW305\n");
    out.push_str("  package  - GW106-GW108, GW213, GW501-GW504\n");
    out.push_str("  style    - GW401-GW405\n");
    out.push_str("  all      - every check (default)\n");

    out.push_str("\nUse --suite and --checks to select checks, e.g.:\n");
    out.push_str("  gw-conform check --suite generic\n");
    out.push_str("  gw-conform check --checks 'GW2*,has-src-directory'\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_check_with_its_suite() {
        let listing = render();
        let rows: Vec<&str> = listing.lines().filter(|l| l.starts_with("GW")).collect();
        assert_eq!(rows.len(), 36);
        assert!(rows[0].starts_with("GW101   has-src-directory"));
        assert!(rows.iter().any(|r| r.starts_with("GW213") && r.contains("package")));
        assert!(rows.iter().any(|r| r.starts_with("GW405") && r.contains("style")));
        assert!(rows.iter().any(|r| r.starts_with("GW501") && r.contains("imports")));
    }
}
