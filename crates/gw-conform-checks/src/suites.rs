//! Named groups of checks.

use crate::imports::import_checks;
use crate::pyproject::{poetry_checks, PackagesInNamespace};
use crate::ruff::ruff_checks;
use crate::structure::{
    has_contributing_file, has_license_file, has_namespace_directory, has_readme_file,
    has_src_directory, has_tests_directory, HasPackageDirectory, NamespaceIsImplicit,
};
use crate::style::style_checks;
use gw_conform_core::{CheckBox, Config};

/// Check suites for gw-conform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Suite {
    /// Conventions every repository follows: layout basics, poetry metadata, ruff.
    Generic,
    /// Conventions for packages in the namespace: namespace layout and imports.
    Package,
    /// Formatter, import sorter and tool availability.
    Style,
    /// Every check.
    #[default]
    All,
}

impl Suite {
    /// Every suite, in display order.
    pub const ALL: [Suite; 4] = [Self::Generic, Self::Package, Self::Style, Self::All];

    /// Parses a suite name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "generic" => Some(Self::Generic),
            "package" => Some(Self::Package),
            "style" => Some(Self::Style),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Returns the suite name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Package => "package",
            Self::Style => "style",
            Self::All => "all",
        }
    }

    /// Returns the checks of this suite, configured from `config`.
    #[must_use]
    pub fn checks(self, config: &Config) -> Vec<CheckBox> {
        match self {
            Self::Generic => generic_checks(config),
            Self::Package => package_checks(),
            Self::Style => style_checks(config),
            Self::All => all_checks(config),
        }
    }

    /// Returns the check names of this suite, in run order.
    #[must_use]
    pub fn check_names(self) -> Vec<&'static str> {
        self.checks(&Config::default())
            .iter()
            .map(|c| c.name())
            .collect()
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the generic checks.
///
/// Includes:
/// - GW101-GW105: root layout
/// - GW201-GW212, GW214: poetry metadata and build system
/// - GW301-GW305: ruff configuration
#[must_use]
pub fn generic_checks(config: &Config) -> Vec<CheckBox> {
    let mut checks: Vec<CheckBox> = vec![
        Box::new(has_src_directory()),
        Box::new(has_tests_directory()),
        Box::new(has_contributing_file()),
        Box::new(has_readme_file()),
        Box::new(has_license_file()),
    ];
    checks.extend(
        poetry_checks(&config.build_system.backend)
            .into_iter()
            .filter(|c| c.code() != "GW213"),
    );
    checks.extend(ruff_checks());
    checks
}

/// Returns the namespace package checks.
///
/// Includes:
/// - GW106-GW108: namespace layout
/// - GW213: packages declared in the namespace
/// - GW501-GW504: importability
#[must_use]
pub fn package_checks() -> Vec<CheckBox> {
    let mut checks: Vec<CheckBox> = vec![
        Box::new(has_namespace_directory()),
        Box::new(NamespaceIsImplicit),
        Box::new(HasPackageDirectory),
        Box::new(PackagesInNamespace),
    ];
    checks.extend(import_checks());
    checks
}

/// Returns every available check, ordered by code.
#[must_use]
pub fn all_checks(config: &Config) -> Vec<CheckBox> {
    let mut checks = generic_checks(config);
    checks.extend(package_checks());
    checks.extend(style_checks(config));
    checks.sort_by_key(|c| c.code());
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn suite_names_round_trip() {
        for suite in Suite::ALL {
            assert_eq!(Suite::from_name(suite.name()), Some(suite));
        }
        assert_eq!(Suite::from_name("strict"), None);
        assert_eq!(Suite::default(), Suite::All);
    }

    #[test]
    fn suite_sizes() {
        let config = Config::default();
        assert_eq!(Suite::Generic.checks(&config).len(), 23);
        assert_eq!(Suite::Package.checks(&config).len(), 8);
        assert_eq!(Suite::Style.checks(&config).len(), 5);
        assert_eq!(Suite::All.checks(&config).len(), 36);
    }

    #[test]
    fn all_is_union_of_partitions_with_unique_names() {
        let names = Suite::All.check_names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());

        let mut parts: Vec<_> = [Suite::Generic, Suite::Package, Suite::Style]
            .iter()
            .flat_map(|s| s.check_names())
            .collect();
        let mut all = names.clone();
        parts.sort_unstable();
        all.sort_unstable();
        assert_eq!(parts, all);
    }

    #[test]
    fn all_is_ordered_by_code() {
        let config = Config::default();
        let codes: Vec<_> = all_checks(&config).iter().map(|c| c.code()).collect();
        assert_eq!(codes.first(), Some(&"GW101"));
        assert_eq!(codes.last(), Some(&"GW504"));
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
    }
}
