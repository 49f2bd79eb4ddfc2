use crate::boundary_analysis::domain::Distribution;
use crate::shared::Result;
use std::path::Path;

/// ManifestReader port for reading a local package's distribution metadata
pub trait ManifestReader {
    /// Reads the install name, declared requirements and importable names
    /// of the package rooted at `package_path`
    ///
    /// # Returns
    /// `Ok(None)` when no metadata could be found or generated
    ///
    /// # Errors
    /// Returns an error if a manifest exists but cannot be parsed
    fn read_distribution(&self, package_path: &Path) -> Result<Option<Distribution>>;
}
