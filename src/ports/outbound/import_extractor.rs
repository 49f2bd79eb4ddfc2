use crate::shared::Result;
use std::path::{Path, PathBuf};

/// Raw import targets of one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedImports {
    /// Resolved target files (or package directories). Unresolved imports
    /// appear as `UNKNOWN/<dotted.module>`.
    pub targets: Vec<PathBuf>,
    /// Non-fatal problems met while reading this file
    pub errors: Vec<String>,
}

/// ImportExtractor port for discovering the imports of a source file
///
/// Implementations report unresolved imports as targets below the
/// `UNKNOWN` pseudo-root instead of failing.
pub trait ImportExtractor {
    /// Finds the files a source file depends on
    ///
    /// # Arguments
    /// * `file_path` - Absolute path of the source file
    ///
    /// # Returns
    /// Target paths plus the non-fatal errors met while parsing
    ///
    /// # Errors
    /// Returns an error if the file cannot be read at all
    fn find_dependencies(&self, file_path: &Path) -> Result<ExtractedImports>;
}
