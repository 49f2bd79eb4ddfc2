use crate::boundary_analysis::domain::Distribution;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single remote lookup
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Connection failure or timeout; trips the circuit breaker
    #[error("Package index unreachable: {0}")]
    Unreachable(String),

    /// The artifact of one distribution could not be processed
    #[error("Failed to process artifact of '{name}': {details}")]
    Artifact { name: String, details: String },

    /// Lookup skipped because the index stopped responding earlier in the run
    #[error("Package index lookup skipped: index is not responding")]
    CircuitOpen,
}

/// PackageIndex port for resolving distributions from a remote index
///
/// # Async Support
/// Lookups are async so several names can be resolved concurrently.
/// Implementations must be `Send + Sync`.
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Resolves one requirement name to its distribution
    ///
    /// # Arguments
    /// * `name` - Requirement name as declared in a manifest
    ///
    /// # Returns
    /// `Ok(None)` if the index does not know the name
    ///
    /// # Errors
    /// See [`IndexError`]
    async fn fetch_distribution(&self, name: &str) -> Result<Option<Distribution>, IndexError>;

    /// Whether remote calls may still be attempted in this run
    fn is_available(&self) -> bool {
        true
    }
}
