use crate::boundary_analysis::domain::RootCache;
use crate::shared::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// PackageLocator port for finding package boundaries on disk
pub trait PackageLocator {
    /// Locates every package root below the source roots
    ///
    /// A package root is a directory holding a manifest marker file.
    ///
    /// # Errors
    /// Returns an error if a source root cannot be walked
    fn find_package_roots(&self, source_roots: &[PathBuf]) -> Result<BTreeSet<PathBuf>>;

    /// Builds the file -> root memoization for every file below a package root
    ///
    /// Implementations may register additional resolution data (module
    /// names) with the import extractor they share state with.
    fn preload(&self, source_roots: &[PathBuf]) -> Result<RootCache>;

    /// Lists the source files owned by one package, sorted
    ///
    /// Files of nested package roots and ignored files are excluded.
    fn list_package_files(&self, package_path: &Path) -> Result<Vec<PathBuf>>;
}
