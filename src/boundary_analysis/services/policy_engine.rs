use crate::boundary_analysis::domain::{DependencyEdge, FindingSet, PackagePolicy};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Result of checking observed edges against the allow-lists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyAnalysis {
    pub invalid_dependencies: HashSet<DependencyEdge>,
    pub redundant_dependencies: HashMap<String, HashSet<String>>,
}

impl PolicyAnalysis {
    pub fn into_finding_sets(self) -> Vec<FindingSet> {
        vec![
            FindingSet::InvalidDependencies(self.invalid_dependencies),
            FindingSet::RedundantDependencies(self.redundant_dependencies),
        ]
    }
}

/// Checks each package's local edges against its allow-list
pub struct PolicyEngine;

impl PolicyEngine {
    /// Computes invalid and redundant findings for every analyzed package.
    ///
    /// A package without a policy, or with an undefined allow-list, denies
    /// every local dependency. Unknown edges are never local and therefore
    /// never policy-checked.
    pub fn analyze(
        package_edges: &BTreeMap<String, HashSet<DependencyEdge>>,
        policies: &BTreeMap<String, PackagePolicy>,
    ) -> PolicyAnalysis {
        let mut analysis = PolicyAnalysis::default();

        for (package, edges) in package_edges {
            let local_edges: Vec<&DependencyEdge> =
                edges.iter().filter(|edge| edge.is_local()).collect();
            let policy = policies.get(package);

            let Some(allowed) = policy.and_then(PackagePolicy::allowed_dependencies) else {
                analysis
                    .invalid_dependencies
                    .extend(local_edges.into_iter().cloned());
                continue;
            };

            for edge in &local_edges {
                if !allowed.contains(edge.target_package()) {
                    analysis.invalid_dependencies.insert((*edge).clone());
                }
            }

            if policy.is_some_and(PackagePolicy::ignore_redundant) {
                continue;
            }

            let used: HashSet<&str> = local_edges.iter().map(|e| e.target_package()).collect();
            let redundant: HashSet<String> = allowed
                .iter()
                .filter(|name| !used.contains(name.as_str()))
                .cloned()
                .collect();
            if !redundant.is_empty() {
                analysis
                    .redundant_dependencies
                    .insert(package.clone(), redundant);
            }
        }

        analysis
    }
}
