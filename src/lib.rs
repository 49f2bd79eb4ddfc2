//! import-fence - architectural boundary checker for Python source trees
//!
//! This library discovers the packages under one or more source roots,
//! builds a per-package dependency graph from their import statements and
//! checks it against an allow-list of inter-package dependencies. It can
//! also reconcile each package's declared requirements against what its
//! code actually imports. It follows hexagonal architecture and
//! Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`boundary_analysis`): Edges, policies, findings and the pure services over them
//! - **Application Layer** (`application`): The check use case and its DTOs
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use import_fence::prelude::*;
//! use std::collections::BTreeMap;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! let environment = PythonEnvironment::discover("python3").await?;
//! let source_roots = vec![PathBuf::from("/repo/src")];
//! let module_index = Arc::new(ModuleIndex::new());
//!
//! // Create adapters
//! let locator = FileSystemPackageLocator::new(IgnoreFilter::new(vec![])?, module_index.clone());
//! let extractor = PythonImportExtractor::new(&environment, module_index, &source_roots)?;
//! let manifest_reader = FileSystemManifestReader::new("python3");
//! let progress_reporter = StderrProgressReporter::new();
//!
//! // Create use case
//! let use_case = CheckBoundariesUseCase::new(
//!     locator,
//!     extractor,
//!     manifest_reader,
//!     progress_reporter,
//!     None::<PyPiPackageIndex>,
//!     environment.runtime_layout(),
//! );
//!
//! // Execute
//! let mut dependency_map = BTreeMap::new();
//! dependency_map.insert("svc_a".to_string(), vec!["svc_b".to_string()]);
//! let request = CheckRequest::new(source_roots).with_dependency_map(dependency_map);
//! let response = use_case.execute(request).await?;
//!
//! if let Some(report) = response.report() {
//!     println!("{}", report);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod boundary_analysis;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemManifestReader, FileSystemPackageLocator, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
    pub use crate::adapters::outbound::network::{CircuitBreakingPackageIndex, PyPiPackageIndex};
    pub use crate::adapters::outbound::python::{PythonEnvironment, PythonImportExtractor};
    pub use crate::application::dto::{CheckRequest, CheckResponse, OutputFormat};
    pub use crate::application::use_cases::CheckBoundariesUseCase;
    pub use crate::boundary_analysis::domain::{
        DependencyEdge, Distribution, EdgeClassification, FindingKind, FindingSet, ModuleIndex,
        PackagePolicy, RegistryCache, RootCache, RuntimeLayout,
    };
    pub use crate::boundary_analysis::services::{
        CycleDetector, EdgeClassifier, GraphBuilder, IgnoreFilter, PolicyBuilder, PolicyEngine,
        RequirementReconciler, ResultAggregator,
    };
    pub use crate::ports::outbound::{
        ImportExtractor, IndexError, ManifestReader, OutputPresenter, PackageIndex,
        PackageLocator, ProgressReporter, ReportFormatter,
    };
    pub use crate::shared::error::{ExitCode, FenceError};
    pub use crate::shared::Result;
}
