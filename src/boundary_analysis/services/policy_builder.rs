use crate::boundary_analysis::domain::PackagePolicy;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Turns the configured dependency map into one policy per package.
pub struct PolicyBuilder;

impl PolicyBuilder {
    /// Builds policies for every analyzed package and every map entry.
    ///
    /// # Arguments
    /// * `dependency_map` - package name -> allowed names as configured
    /// * `packages` - discovered package name -> package root
    /// * `source_roots` - absolute source roots wildcards are resolved against
    ///
    /// Analyzed packages missing from the map get an undefined policy.
    /// Map entries whose package was not discovered still get a policy so
    /// cycle detection sees the whole declared graph.
    pub fn build(
        dependency_map: &BTreeMap<String, Vec<String>>,
        packages: &BTreeMap<String, PathBuf>,
        analyzed: &BTreeSet<String>,
        source_roots: &[PathBuf],
    ) -> BTreeMap<String, PackagePolicy> {
        let mut policies = BTreeMap::new();

        for (package, entries) in dependency_map {
            let package_path = packages.get(package).cloned().unwrap_or_default();
            let mut declared = BTreeSet::new();
            let mut expanded = BTreeSet::new();

            for entry in entries {
                match wildcard_prefix(entry) {
                    Some(prefix) => expanded.extend(
                        expand_wildcard(prefix, packages, source_roots)
                            .into_iter()
                            .filter(|name| name != package),
                    ),
                    None => {
                        declared.insert(entry.trim().to_string());
                    }
                }
            }

            let policy = PackagePolicy::allowing(package.as_str(), package_path, declared, expanded)
                .with_ignore_redundant(entries.iter().any(|e| wildcard_prefix(e).is_some()));
            policies.insert(package.clone(), policy);
        }

        for package in analyzed {
            if !policies.contains_key(package) {
                let package_path = packages.get(package).cloned().unwrap_or_default();
                policies.insert(
                    package.clone(),
                    PackagePolicy::undefined(package.as_str(), package_path),
                );
            }
        }

        policies
    }
}

/// `libs/` and `libs/*` are wildcards over the `libs` subtree; `*` covers everything
fn wildcard_prefix(entry: &str) -> Option<&str> {
    let entry = entry.trim();
    if entry == "*" {
        return Some("");
    }
    entry
        .strip_suffix("/*")
        .or_else(|| entry.strip_suffix('/'))
        .map(|prefix| prefix.trim_matches('/'))
}

fn expand_wildcard(
    prefix: &str,
    packages: &BTreeMap<String, PathBuf>,
    source_roots: &[PathBuf],
) -> BTreeSet<String> {
    let bases: Vec<PathBuf> = source_roots
        .iter()
        .map(|root| {
            if prefix.is_empty() {
                root.clone()
            } else {
                root.join(prefix)
            }
        })
        .collect();

    packages
        .iter()
        .filter(|(_, path)| is_below_any(path, &bases))
        .map(|(name, _)| name.clone())
        .collect()
}

fn is_below_any(path: &Path, bases: &[PathBuf]) -> bool {
    bases
        .iter()
        .any(|base| path.starts_with(base) && path != base.as_path())
}
