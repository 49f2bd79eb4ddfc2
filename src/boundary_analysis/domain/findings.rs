use super::dependency_edge::DependencyEdge;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Category of a finding; the declaration order is the report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    InvalidDependencies,
    RedundantDependencies,
    MissingRequirements,
    ExtraRequirements,
}

/// Findings of one category, each variant carrying its own payload.
///
/// Collections are unordered; ordering is applied when a report is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingSet {
    /// Local edges not covered by the source package's allow-list
    InvalidDependencies(HashSet<DependencyEdge>),
    /// Package -> allow-list entries never matched by a local edge
    RedundantDependencies(HashMap<String, HashSet<String>>),
    /// Package -> imported names missing from its requirements
    MissingRequirements(HashMap<String, HashSet<String>>),
    /// Package -> declared requirements that are never imported
    ExtraRequirements(HashMap<String, HashSet<String>>),
}

impl FindingSet {
    pub fn kind(&self) -> FindingKind {
        match self {
            FindingSet::InvalidDependencies(_) => FindingKind::InvalidDependencies,
            FindingSet::RedundantDependencies(_) => FindingKind::RedundantDependencies,
            FindingSet::MissingRequirements(_) => FindingKind::MissingRequirements,
            FindingSet::ExtraRequirements(_) => FindingKind::ExtraRequirements,
        }
    }

    /// Whether the set holds no finding at all (empty per-package sets count as none)
    pub fn is_empty(&self) -> bool {
        match self {
            FindingSet::InvalidDependencies(edges) => edges.is_empty(),
            FindingSet::RedundantDependencies(map)
            | FindingSet::MissingRequirements(map)
            | FindingSet::ExtraRequirements(map) => map.values().all(HashSet::is_empty),
        }
    }

    /// Folds the findings as `package -> names`
    pub fn by_package(&self) -> HashMap<String, HashSet<String>> {
        match self {
            FindingSet::InvalidDependencies(edges) => {
                let mut grouped: HashMap<String, HashSet<String>> = HashMap::new();
                for edge in edges {
                    grouped
                        .entry(edge.source_package().to_string())
                        .or_default()
                        .insert(edge.target_package().to_string());
                }
                grouped
            }
            FindingSet::RedundantDependencies(map)
            | FindingSet::MissingRequirements(map)
            | FindingSet::ExtraRequirements(map) => map
                .iter()
                .filter(|(_, names)| !names.is_empty())
                .map(|(package, names)| (package.clone(), names.clone()))
                .collect(),
        }
    }

    /// Merges another set of the same kind into this one
    ///
    /// # Errors
    /// Returns the other set unchanged when the kinds differ
    pub fn merge(&mut self, other: FindingSet) -> Result<(), FindingSet> {
        match (self, other) {
            (FindingSet::InvalidDependencies(ours), FindingSet::InvalidDependencies(theirs)) => {
                ours.extend(theirs);
                Ok(())
            }
            (FindingSet::RedundantDependencies(ours), FindingSet::RedundantDependencies(theirs))
            | (FindingSet::MissingRequirements(ours), FindingSet::MissingRequirements(theirs))
            | (FindingSet::ExtraRequirements(ours), FindingSet::ExtraRequirements(theirs)) => {
                for (package, names) in theirs {
                    ours.entry(package).or_default().extend(names);
                }
                Ok(())
            }
            (_, other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary_analysis::domain::EdgeClassification;
    use std::path::PathBuf;

    fn edge(source: &str, target: &str) -> DependencyEdge {
        DependencyEdge::new(
            source,
            PathBuf::from(format!("/repo/{}/{}/x.py", source, source)),
            PathBuf::from(format!("/repo/{}", target)),
            PathBuf::from(format!("/repo/{}/{}/y.py", target, target)),
            target,
            EdgeClassification::Local,
        )
    }

    fn names(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_per_package_sets_count_as_empty() {
        let mut map = HashMap::new();
        map.insert("svc_a".to_string(), HashSet::new());
        assert!(FindingSet::MissingRequirements(map).is_empty());
        assert!(FindingSet::InvalidDependencies(HashSet::new()).is_empty());
    }

    #[test]
    fn test_invalid_dependencies_grouped_by_source() {
        let edges: HashSet<_> = [edge("svc_a", "svc_c"), edge("svc_a", "svc_d"), edge("svc_b", "svc_c")]
            .into_iter()
            .collect();
        let grouped = FindingSet::InvalidDependencies(edges).by_package();

        assert_eq!(grouped["svc_a"], names(&["svc_c", "svc_d"]));
        assert_eq!(grouped["svc_b"], names(&["svc_c"]));
    }

    #[test]
    fn test_merge_same_kind() {
        let mut first = FindingSet::ExtraRequirements(
            [("svc_a".to_string(), names(&["foo"]))].into_iter().collect(),
        );
        let second = FindingSet::ExtraRequirements(
            [
                ("svc_a".to_string(), names(&["bar"])),
                ("svc_b".to_string(), names(&["baz"])),
            ]
            .into_iter()
            .collect(),
        );
        first.merge(second).unwrap();

        let grouped = first.by_package();
        assert_eq!(grouped["svc_a"], names(&["foo", "bar"]));
        assert_eq!(grouped["svc_b"], names(&["baz"]));
    }

    #[test]
    fn test_merge_different_kind_is_rejected() {
        let mut first = FindingSet::InvalidDependencies(HashSet::new());
        let second = FindingSet::MissingRequirements(HashMap::new());
        let rejected = first.merge(second).unwrap_err();
        assert_eq!(rejected.kind(), FindingKind::MissingRequirements);
    }
}
