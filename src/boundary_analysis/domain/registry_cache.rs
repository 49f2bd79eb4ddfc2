use super::distribution::{normalize_key, Distribution};
use dashmap::DashMap;

/// Distribution registry for one analysis run.
///
/// Seeded with every local package before any remote lookup, then grows
/// with each successful remote resolution. Nothing is ever evicted, and a
/// key keeps the first distribution written for it.
#[derive(Debug, Default)]
pub struct RegistryCache {
    distributions: DashMap<String, Distribution>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a distribution. Returns `false` when its key was already present.
    pub fn insert(&self, distribution: Distribution) -> bool {
        let mut inserted = false;
        self.distributions
            .entry(distribution.key().to_string())
            .or_insert_with(|| {
                inserted = true;
                distribution
            });
        inserted
    }

    /// Looks a distribution up by any spelling of its install name
    pub fn get(&self, requirement_name: &str) -> Option<Distribution> {
        self.distributions
            .get(&normalize_key(requirement_name))
            .map(|entry| entry.value().clone())
    }

    pub fn contains(&self, requirement_name: &str) -> bool {
        self.distributions
            .contains_key(&normalize_key(requirement_name))
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}
