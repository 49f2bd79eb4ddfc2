use crate::boundary_analysis::domain::{normalize_key, DependencyEdge, Distribution, RegistryCache};
use crate::boundary_analysis::services::{RequirementDelta, RequirementReconciler};
use crate::ports::outbound::{IndexError, PackageIndex};
use dashmap::DashSet;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Default bound on concurrent index lookups
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Distributions found for a batch of requirement names
#[derive(Debug, Default)]
pub struct Resolution {
    /// Requirement name (as declared) -> distribution
    pub resolved: HashMap<String, Distribution>,
    /// One message per name the index could not resolve
    pub warnings: Vec<String>,
}

/// Resolves requirement names to distributions: registry first, then the
/// remote index.
///
/// Each normalized name is sent to the index at most once per run. Names
/// belonging to local packages never leave the registry.
pub struct RequirementResolver<'a, I: PackageIndex> {
    registry: &'a RegistryCache,
    index: Option<&'a I>,
    local_keys: HashSet<String>,
    attempted: DashSet<String>,
    max_concurrent: usize,
}

impl<'a, I: PackageIndex> RequirementResolver<'a, I> {
    /// # Arguments
    /// * `registry` - Run-scoped cache, already seeded with local packages
    /// * `index` - Remote index, `None` when third-party lookups are disabled
    /// * `local_names` - Names of every local package and distribution
    pub fn new(
        registry: &'a RegistryCache,
        index: Option<&'a I>,
        local_names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            registry,
            index,
            local_keys: local_names.into_iter().map(|n| normalize_key(&n)).collect(),
            attempted: DashSet::new(),
            max_concurrent: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Resolves every name it can; never fails as a whole
    pub async fn resolve(&self, names: &BTreeSet<String>) -> Resolution {
        let mut resolution = Resolution::default();
        let mut pending = Vec::new();

        for name in names {
            match self.registry.get(name) {
                Some(distribution) => {
                    resolution.resolved.insert(name.clone(), distribution);
                }
                None => pending.push(name.clone()),
            }
        }

        let Some(index) = self.index else {
            return resolution;
        };
        pending.retain(|name| {
            let key = normalize_key(name);
            !self.local_keys.contains(&key) && self.attempted.insert(key)
        });
        if pending.is_empty() || !index.is_available() {
            return resolution;
        }

        let mut results: Vec<(String, Result<Option<Distribution>, IndexError>)> =
            stream::iter(pending)
                .map(|name| async move {
                    let result = index.fetch_distribution(&name).await;
                    (name, result)
                })
                .buffer_unordered(self.max_concurrent)
                .collect()
                .await;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, result) in results {
            match result {
                Ok(Some(distribution)) => {
                    self.registry.insert(distribution.clone());
                    resolution.resolved.insert(name, distribution);
                }
                Ok(None) => resolution
                    .warnings
                    .push(format!("'{}' was not found on the package index", name)),
                Err(IndexError::CircuitOpen) => {}
                Err(e @ IndexError::Unreachable(_)) => resolution.warnings.push(format!(
                    "{}; remote resolution is disabled for the rest of the run",
                    e
                )),
                Err(e) => resolution.warnings.push(e.to_string()),
            }
        }

        resolution
    }

    /// Missing and extra requirements of one package, with install-name
    /// aliases cancelled out
    pub async fn reconcile(
        &self,
        declared: &HashSet<String>,
        edges: &HashSet<DependencyEdge>,
    ) -> (RequirementDelta, Vec<String>) {
        let imported = RequirementReconciler::imported_names(edges);
        let mut delta = RequirementReconciler::diff(declared, &imported);
        if delta.extra.is_empty() {
            return (delta, Vec::new());
        }

        let extra: BTreeSet<String> = delta.extra.iter().cloned().collect();
        let resolution = self.resolve(&extra).await;
        RequirementReconciler::apply_aliases(&mut delta, &resolution.resolved);
        (delta, resolution.warnings)
    }
}
