pub mod dependency_edge;
pub mod distribution;
pub mod findings;
pub mod module_index;
pub mod package_policy;
pub mod registry_cache;
pub mod root_cache;
pub mod runtime_layout;

pub use dependency_edge::{DependencyEdge, EdgeClassification, UNKNOWN_ROOT};
pub use distribution::{normalize_key, parse_requirement_name, Distribution};
pub use findings::{FindingKind, FindingSet};
pub use module_index::ModuleIndex;
pub use package_policy::PackagePolicy;
pub use registry_cache::RegistryCache;
pub use root_cache::RootCache;
pub use runtime_layout::RuntimeLayout;
