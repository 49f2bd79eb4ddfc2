use crate::boundary_analysis::domain::PackagePolicy;
use std::collections::{BTreeMap, BTreeSet};

/// Detects cycles in the declared allow-list graph.
///
/// Nodes are packages with a defined policy; edges run from a package to
/// every literally declared dependency that is itself a node. Wildcard
/// expansions are not part of the graph.
pub struct CycleDetector;

impl CycleDetector {
    /// Returns the packages left over after peeling, or `None` when acyclic.
    ///
    /// Each round removes the nodes no remaining node depends on. When a
    /// round removes nothing while nodes remain, the remainder contains a cycle.
    pub fn find_cycle(policies: &BTreeMap<String, PackagePolicy>) -> Option<BTreeSet<String>> {
        let mut graph: BTreeMap<&str, BTreeSet<&str>> = policies
            .values()
            .filter(|policy| policy.is_defined())
            .map(|policy| (policy.package_name(), BTreeSet::new()))
            .collect();

        for policy in policies.values().filter(|policy| policy.is_defined()) {
            let targets: BTreeSet<&str> = policy
                .declared_dependencies()
                .iter()
                .map(String::as_str)
                .filter(|name| graph.contains_key(name))
                .collect();
            graph.insert(policy.package_name(), targets);
        }

        loop {
            if graph.is_empty() {
                return None;
            }

            let depended_upon: BTreeSet<&str> =
                graph.values().flat_map(|targets| targets.iter().copied()).collect();
            let removable: Vec<&str> = graph
                .keys()
                .copied()
                .filter(|node| !depended_upon.contains(node))
                .collect();

            if removable.is_empty() {
                return Some(graph.keys().map(|node| node.to_string()).collect());
            }
            for node in removable {
                graph.remove(node);
            }
        }
    }

    /// Renders the full policy input as `a -> [b, c], b -> []`
    pub fn describe_policies(policies: &BTreeMap<String, PackagePolicy>) -> String {
        policies
            .values()
            .filter(|policy| policy.is_defined())
            .map(|policy| {
                let declared: Vec<&str> = policy
                    .declared_dependencies()
                    .iter()
                    .map(String::as_str)
                    .collect();
                format!("{} -> [{}]", policy.package_name(), declared.join(", "))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
