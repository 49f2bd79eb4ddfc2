use std::collections::BTreeMap;
use std::path::PathBuf;

/// CheckRequest - Internal request DTO for the boundary check use case
///
/// Built from the parsed configuration and CLI overrides; the use case
/// never sees the configuration file itself.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    /// Absolute source roots packages are discovered below
    pub source_roots: Vec<PathBuf>,
    /// Packages to analyze; `None` analyzes every discovered package
    pub analysis_packages: Option<Vec<String>>,
    /// Package name -> allowed dependency names (wildcard entries included)
    pub dependency_map: BTreeMap<String, Vec<String>>,
    /// Abort when the allow-list graph is cyclic
    pub check_cyclic: bool,
    /// Reconcile manifest requirements against imports
    pub check_requirements: bool,
    /// Never consult the remote package index
    pub ignore_third_party: bool,
}

impl CheckRequest {
    pub fn new(source_roots: Vec<PathBuf>) -> Self {
        Self {
            source_roots,
            analysis_packages: None,
            dependency_map: BTreeMap::new(),
            check_cyclic: false,
            check_requirements: false,
            ignore_third_party: true,
        }
    }

    pub fn with_analysis_packages(mut self, packages: Option<Vec<String>>) -> Self {
        self.analysis_packages = packages;
        self
    }

    pub fn with_dependency_map(mut self, dependency_map: BTreeMap<String, Vec<String>>) -> Self {
        self.dependency_map = dependency_map;
        self
    }

    pub fn with_check_cyclic(mut self, check_cyclic: bool) -> Self {
        self.check_cyclic = check_cyclic;
        self
    }

    pub fn with_check_requirements(mut self, check_requirements: bool) -> Self {
        self.check_requirements = check_requirements;
        self
    }

    pub fn with_ignore_third_party(mut self, ignore_third_party: bool) -> Self {
        self.ignore_third_party = ignore_third_party;
        self
    }
}
