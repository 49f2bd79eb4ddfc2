use crate::boundary_analysis::domain::Distribution;
use crate::ports::outbound::{IndexError, PackageIndex};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// CircuitBreakingPackageIndex wraps a PackageIndex and stops calling it
/// after the first connectivity failure.
///
/// The flag is sticky for the lifetime of the wrapper (one run) and is
/// checked before every call, so lookups issued after the trip return
/// `IndexError::CircuitOpen` without touching the network. There are no
/// retries.
pub struct CircuitBreakingPackageIndex<I: PackageIndex> {
    inner: I,
    tripped: Arc<AtomicBool>,
}

impl<I: PackageIndex> CircuitBreakingPackageIndex<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            tripped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<I: PackageIndex> PackageIndex for CircuitBreakingPackageIndex<I> {
    async fn fetch_distribution(&self, name: &str) -> Result<Option<Distribution>, IndexError> {
        if self.is_tripped() {
            return Err(IndexError::CircuitOpen);
        }

        let result = self.inner.fetch_distribution(name).await;
        if matches!(result, Err(IndexError::Unreachable(_))) {
            self.tripped.store(true, Ordering::SeqCst);
        }
        result
    }

    fn is_available(&self) -> bool {
        !self.is_tripped() && self.inner.is_available()
    }
}
