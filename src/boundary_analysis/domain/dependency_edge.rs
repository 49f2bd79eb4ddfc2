use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Pseudo-root used by import extractors for imports that could not be resolved.
///
/// An unresolved `import foo.bar` is reported as the target `UNKNOWN/foo.bar`.
pub const UNKNOWN_ROOT: &str = "UNKNOWN";

/// Classification of a package-level dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeClassification {
    /// Target lives in the same source root as the importing file
    Internal,
    /// Target is another package under a configured source root
    Local,
    /// Target is part of the language runtime
    Builtin,
    /// Target is a third-party distribution
    External,
    /// The extractor could not resolve the import
    Unknown,
}

/// Directed dependency from one package to another.
///
/// Equality and hashing only consider `(source_package, target_package)`,
/// so edges originating from different files of the same package collapse.
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    source_package: String,
    source_file: PathBuf,
    target_root: PathBuf,
    target_file: PathBuf,
    target_package: String,
    classification: EdgeClassification,
}

impl DependencyEdge {
    pub fn new(
        source_package: impl Into<String>,
        source_file: PathBuf,
        target_root: PathBuf,
        target_file: PathBuf,
        target_package: impl Into<String>,
        classification: EdgeClassification,
    ) -> Self {
        Self {
            source_package: source_package.into(),
            source_file,
            target_root,
            target_file,
            target_package: target_package.into(),
            classification,
        }
    }

    pub fn source_package(&self) -> &str {
        &self.source_package
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    pub fn target_package(&self) -> &str {
        &self.target_package
    }

    pub fn classification(&self) -> EdgeClassification {
        self.classification
    }

    pub fn is_local(&self) -> bool {
        self.classification == EdgeClassification::Local
    }

    pub fn is_unknown(&self) -> bool {
        self.classification == EdgeClassification::Unknown
    }

    /// Dotted module name of an unresolved import, if this edge is one
    pub fn unresolved_module(&self) -> Option<&str> {
        if !self.is_unknown() {
            return None;
        }
        self.target_file
            .strip_prefix(UNKNOWN_ROOT)
            .ok()
            .and_then(|rest| rest.to_str())
    }
}

impl PartialEq for DependencyEdge {
    fn eq(&self, other: &Self) -> bool {
        self.source_package == other.source_package && self.target_package == other.target_package
    }
}

impl Eq for DependencyEdge {}

impl Hash for DependencyEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_package.hash(state);
        self.target_package.hash(state);
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (from {}) is dependent on {} (to {})",
            self.source_package,
            self.source_file.display(),
            self.target_package,
            self.target_file.display()
        )
    }
}
