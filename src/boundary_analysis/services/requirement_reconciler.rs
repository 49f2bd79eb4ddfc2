use crate::boundary_analysis::domain::{DependencyEdge, Distribution, EdgeClassification};
use std::collections::{HashMap, HashSet};

/// Missing and extra requirement names of one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementDelta {
    pub missing: HashSet<String>,
    pub extra: HashSet<String>,
}

impl RequirementDelta {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Set arithmetic between declared requirements and imported packages.
///
/// Resolution of install names happens outside; this type only consumes
/// already-resolved distributions.
pub struct RequirementReconciler;

impl RequirementReconciler {
    /// Package names a package imports, as seen by requirement checking.
    ///
    /// Builtin and internal edges never count. Local siblings do, since a
    /// package must declare the sibling distributions it imports.
    pub fn imported_names(edges: &HashSet<DependencyEdge>) -> HashSet<String> {
        edges
            .iter()
            .filter(|edge| {
                !matches!(
                    edge.classification(),
                    EdgeClassification::Builtin | EdgeClassification::Internal
                )
            })
            .map(|edge| edge.target_package().to_string())
            .collect()
    }

    /// `missing = imported - declared`, `extra = declared - imported`
    pub fn diff(declared: &HashSet<String>, imported: &HashSet<String>) -> RequirementDelta {
        RequirementDelta {
            missing: imported.difference(declared).cloned().collect(),
            extra: declared.difference(imported).cloned().collect(),
        }
    }

    /// Cancels install-name/import-name mismatches.
    ///
    /// `resolved` maps an extra requirement name to its distribution. When
    /// one of the distribution's importable names is missing, every such
    /// importable name leaves `missing` and the requirement leaves `extra`.
    pub fn apply_aliases(delta: &mut RequirementDelta, resolved: &HashMap<String, Distribution>) {
        let mut requirement_names: Vec<&String> = resolved.keys().collect();
        requirement_names.sort();

        for requirement in requirement_names {
            if !delta.extra.contains(requirement.as_str()) {
                continue;
            }
            let distribution = &resolved[requirement];
            let aliased: Vec<&String> = distribution
                .importable_names()
                .iter()
                .filter(|name| delta.missing.contains(name.as_str()))
                .collect();
            if aliased.is_empty() {
                continue;
            }
            for name in aliased {
                delta.missing.remove(name.as_str());
            }
            delta.extra.remove(requirement.as_str());
        }
    }
}
