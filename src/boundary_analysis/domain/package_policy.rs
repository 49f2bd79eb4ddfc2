use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Allow-list of one analyzed package.
///
/// `allowed_dependencies` distinguishes an empty allow-list (no local
/// dependency permitted) from an undefined one (`None`, package absent from
/// the dependency map), which also denies every local dependency but takes
/// no part in cycle detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePolicy {
    package_name: String,
    package_path: PathBuf,
    allowed_dependencies: Option<BTreeSet<String>>,
    declared_dependencies: BTreeSet<String>,
    ignore_redundant: bool,
}

impl PackagePolicy {
    /// Policy for a package absent from the dependency map
    pub fn undefined(package_name: impl Into<String>, package_path: PathBuf) -> Self {
        Self {
            package_name: package_name.into(),
            package_path,
            allowed_dependencies: None,
            declared_dependencies: BTreeSet::new(),
            ignore_redundant: false,
        }
    }

    /// Policy with a defined allow-list
    ///
    /// # Arguments
    /// * `declared_dependencies` - names written literally in the map
    /// * `expanded_dependencies` - names produced by directory wildcards;
    ///   when non-empty, redundancy reporting is disabled for this policy
    pub fn allowing(
        package_name: impl Into<String>,
        package_path: PathBuf,
        declared_dependencies: BTreeSet<String>,
        expanded_dependencies: BTreeSet<String>,
    ) -> Self {
        let ignore_redundant = !expanded_dependencies.is_empty();
        let allowed = declared_dependencies
            .iter()
            .cloned()
            .chain(expanded_dependencies)
            .collect();
        Self {
            package_name: package_name.into(),
            package_path,
            allowed_dependencies: Some(allowed),
            declared_dependencies,
            ignore_redundant,
        }
    }

    /// Overrides the redundancy flag
    pub fn with_ignore_redundant(mut self, ignore_redundant: bool) -> Self {
        self.ignore_redundant = ignore_redundant;
        self
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn package_path(&self) -> &Path {
        &self.package_path
    }

    pub fn allowed_dependencies(&self) -> Option<&BTreeSet<String>> {
        self.allowed_dependencies.as_ref()
    }

    pub fn declared_dependencies(&self) -> &BTreeSet<String> {
        &self.declared_dependencies
    }

    pub fn ignore_redundant(&self) -> bool {
        self.ignore_redundant
    }

    pub fn is_defined(&self) -> bool {
        self.allowed_dependencies.is_some()
    }

    pub fn allows(&self, package: &str) -> bool {
        self.allowed_dependencies
            .as_ref()
            .is_some_and(|allowed| allowed.contains(package))
    }
}
