use async_trait::async_trait;
use import_fence::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock PackageIndex serving a fixed set of distributions
///
/// The call counter is shared between clones so a test can keep a handle
/// after moving the index into a use case.
#[derive(Clone, Default)]
pub struct MockPackageIndex {
    distributions: Vec<Distribution>,
    unreachable: bool,
    call_count: Arc<AtomicUsize>,
}

impl MockPackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index whose every lookup fails with a connection error
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_distribution(mut self, name: &str, importable_names: &[&str]) -> Self {
        self.distributions.push(Distribution::new(
            name,
            BTreeSet::new(),
            importable_names.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageIndex for MockPackageIndex {
    async fn fetch_distribution(
        &self,
        name: &str,
    ) -> std::result::Result<Option<Distribution>, IndexError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(IndexError::Unreachable("connection refused".to_string()));
        }
        Ok(self.distributions.iter().find(|d| d.matches(name)).cloned())
    }
}
