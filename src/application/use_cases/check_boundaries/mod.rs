use crate::application::dto::{CheckRequest, CheckResponse};
use crate::application::services::{RequirementResolver, DEFAULT_MAX_CONCURRENT_REQUESTS};
use crate::boundary_analysis::domain::{
    DependencyEdge, Distribution, FindingSet, PackagePolicy, RegistryCache, RootCache,
    RuntimeLayout,
};
use crate::boundary_analysis::services::{
    CycleDetector, GraphBuilder, PolicyBuilder, PolicyEngine, ResultAggregator,
};
use crate::ports::outbound::{
    ImportExtractor, ManifestReader, PackageIndex, PackageLocator, ProgressReporter,
};
use crate::shared::error::FenceError;
use crate::shared::Result;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

type PackageEdges = BTreeMap<String, HashSet<DependencyEdge>>;
type UnresolvedImports = BTreeMap<String, BTreeSet<String>>;

/// CheckBoundariesUseCase - Core use case for one boundary check run
///
/// Discovers packages, builds their dependency graphs, checks them against
/// the allow-lists and optionally reconciles manifest requirements. All
/// run-scoped caches are created inside `execute`, so one use case value can
/// run several checks.
///
/// # Type Parameters
/// * `PL` - PackageLocator implementation
/// * `IE` - ImportExtractor implementation
/// * `MR` - ManifestReader implementation
/// * `PR` - ProgressReporter implementation
/// * `IDX` - PackageIndex implementation (optional)
pub struct CheckBoundariesUseCase<PL, IE, MR, PR, IDX> {
    package_locator: PL,
    import_extractor: IE,
    manifest_reader: MR,
    progress_reporter: PR,
    package_index: Option<IDX>,
    runtime: RuntimeLayout,
    max_concurrent_requests: usize,
}

impl<PL, IE, MR, PR, IDX> CheckBoundariesUseCase<PL, IE, MR, PR, IDX>
where
    PL: PackageLocator,
    IE: ImportExtractor,
    MR: ManifestReader,
    PR: ProgressReporter,
    IDX: PackageIndex,
{
    pub fn new(
        package_locator: PL,
        import_extractor: IE,
        manifest_reader: MR,
        progress_reporter: PR,
        package_index: Option<IDX>,
        runtime: RuntimeLayout,
    ) -> Self {
        Self {
            package_locator,
            import_extractor,
            manifest_reader,
            progress_reporter,
            package_index,
            runtime,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }

    pub fn with_max_concurrent_requests(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests;
        self
    }

    pub fn package_locator(&self) -> &PL {
        &self.package_locator
    }

    /// Executes the boundary check
    ///
    /// # Errors
    /// Configuration errors only: a missing source root or analysis package,
    /// an unparseable manifest, or a policy cycle when `check_cyclic` is set.
    /// Findings are returned in the response, never as an error.
    pub async fn execute(&self, request: CheckRequest) -> Result<CheckResponse> {
        let started = Instant::now();

        // Step 1: Discover packages
        let packages = self.discover_packages(&request)?;
        let analyzed = Self::resolve_analysis_packages(&request, &packages)?;

        // Step 2: Policies and the allow-list cycle check
        let policies = PolicyBuilder::build(
            &request.dependency_map,
            &packages,
            &analyzed,
            &request.source_roots,
        );
        let policy_cycle = self.check_policy_cycle(&request, &policies)?;

        // Step 3: Preload roots and module names
        let root_cache = self.package_locator.preload(&request.source_roots)?;

        // Step 4: Package graphs
        let (package_edges, unresolved_imports) =
            self.build_graphs(&request, &packages, &analyzed, &root_cache)?;

        // Step 5: Policy findings
        let mut aggregator = ResultAggregator::new();
        aggregator.extend(PolicyEngine::analyze(&package_edges, &policies).into_finding_sets());

        // Step 6: Requirement findings
        if request.check_requirements {
            aggregator.extend(
                self.check_requirements(&request, &packages, &package_edges)
                    .await?,
            );
        }

        // Step 7: Response
        let response = CheckResponse {
            has_error: aggregator.has_error(),
            package_count: analyzed.len(),
            sections: aggregator.sections(),
            unresolved_imports,
            policy_cycle,
        };
        self.progress_reporter.report_completion(&format!(
            "✅ Checked {} package(s) in {:.2}s",
            response.package_count,
            started.elapsed().as_secs_f64()
        ));
        Ok(response)
    }

    /// Package name (root directory name) -> package root
    fn discover_packages(&self, request: &CheckRequest) -> Result<BTreeMap<String, PathBuf>> {
        self.progress_reporter.report(&format!(
            "🔍 Discovering packages under {} source root(s)...",
            request.source_roots.len()
        ));

        let mut packages: BTreeMap<String, PathBuf> = BTreeMap::new();
        for root in self.package_locator.find_package_roots(&request.source_roots)? {
            let Some(name) = root.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if let Some(existing) = packages.get(&name) {
                self.progress_reporter.report_warning(&format!(
                    "Package name '{}' is used by {} and {}; keeping the first",
                    name,
                    existing.display(),
                    root.display()
                ));
                continue;
            }
            packages.insert(name, root);
        }

        self.progress_reporter
            .report(&format!("📦 Found {} package(s)", packages.len()));
        Ok(packages)
    }

    fn resolve_analysis_packages(
        request: &CheckRequest,
        packages: &BTreeMap<String, PathBuf>,
    ) -> Result<BTreeSet<String>> {
        let Some(requested) = &request.analysis_packages else {
            return Ok(packages.keys().cloned().collect());
        };

        for package in requested {
            if !packages.contains_key(package) {
                let searched: Vec<String> = request
                    .source_roots
                    .iter()
                    .map(|root| root.display().to_string())
                    .collect();
                return Err(FenceError::PackageNotFound {
                    package: package.clone(),
                    searched: searched.join(", "),
                }
                .into());
            }
        }
        Ok(requested.iter().cloned().collect())
    }

    fn check_policy_cycle(
        &self,
        request: &CheckRequest,
        policies: &BTreeMap<String, PackagePolicy>,
    ) -> Result<Option<Vec<String>>> {
        let Some(members) = CycleDetector::find_cycle(policies) else {
            return Ok(None);
        };
        let members: Vec<String> = members.into_iter().collect();

        if request.check_cyclic {
            return Err(FenceError::PolicyCycle {
                policies: CycleDetector::describe_policies(policies),
                members: members.join(", "),
            }
            .into());
        }

        self.progress_reporter.report_warning(&format!(
            "Allowed dependencies form a cycle between: {}",
            members.join(", ")
        ));
        Ok(Some(members))
    }

    fn build_graphs(
        &self,
        request: &CheckRequest,
        packages: &BTreeMap<String, PathBuf>,
        analyzed: &BTreeSet<String>,
        root_cache: &RootCache,
    ) -> Result<(PackageEdges, UnresolvedImports)> {
        let builder = GraphBuilder::new(
            &self.import_extractor,
            &request.source_roots,
            &self.runtime,
            root_cache,
        );
        let mut package_edges = PackageEdges::new();
        let mut unresolved_imports = UnresolvedImports::new();
        let total = analyzed.len();

        for (idx, package) in analyzed.iter().enumerate() {
            let files = match packages.get(package) {
                Some(path) => self.package_locator.list_package_files(path)?,
                None => Vec::new(),
            };
            let graph = builder.build(package, &files);

            for failure in &graph.failures {
                self.progress_reporter.report_warning(failure);
            }
            if !graph.unresolved_imports.is_empty() {
                let names: Vec<&str> = graph.unresolved_imports.iter().map(String::as_str).collect();
                self.progress_reporter.report_warning(&format!(
                    "{}: could not resolve imports: {}",
                    package,
                    names.join(", ")
                ));
                unresolved_imports.insert(package.clone(), graph.unresolved_imports);
            }

            package_edges.insert(package.clone(), graph.edges);
            self.progress_reporter
                .report_progress(idx + 1, total, Some(package));
        }

        Ok((package_edges, unresolved_imports))
    }

    async fn check_requirements(
        &self,
        request: &CheckRequest,
        packages: &BTreeMap<String, PathBuf>,
        package_edges: &PackageEdges,
    ) -> Result<Vec<FindingSet>> {
        self.progress_reporter
            .report("📋 Reconciling requirements...");

        let registry = RegistryCache::new();
        let manifests = self.seed_registry(packages, &registry)?;

        let local_names = packages
            .keys()
            .cloned()
            .chain(manifests.values().map(|d| d.name().to_string()));
        let index = if request.ignore_third_party {
            None
        } else {
            self.package_index.as_ref()
        };
        let resolver = RequirementResolver::new(&registry, index, local_names)
            .with_max_concurrent(self.max_concurrent_requests);

        let mut missing: HashMap<String, HashSet<String>> = HashMap::new();
        let mut extra: HashMap<String, HashSet<String>> = HashMap::new();

        for (package, edges) in package_edges {
            let declared: HashSet<String> = match manifests.get(package) {
                Some(distribution) => distribution.declared_requirements().iter().cloned().collect(),
                None => {
                    self.progress_reporter.report_warning(&format!(
                        "{}: requirements could not be resolved; checking against an empty list",
                        package
                    ));
                    HashSet::new()
                }
            };

            let (delta, warnings) = resolver.reconcile(&declared, edges).await;
            for warning in &warnings {
                self.progress_reporter.report_warning(warning);
            }
            if !delta.missing.is_empty() {
                missing.insert(package.clone(), delta.missing);
            }
            if !delta.extra.is_empty() {
                extra.insert(package.clone(), delta.extra);
            }
        }

        Ok(vec![
            FindingSet::MissingRequirements(missing),
            FindingSet::ExtraRequirements(extra),
        ])
    }

    /// Registers every local package's distribution before any remote lookup
    fn seed_registry(
        &self,
        packages: &BTreeMap<String, PathBuf>,
        registry: &RegistryCache,
    ) -> Result<BTreeMap<String, Distribution>> {
        let mut manifests = BTreeMap::new();
        for (package, path) in packages {
            match self.manifest_reader.read_distribution(path) {
                Ok(Some(distribution)) => {
                    registry.insert(distribution.clone());
                    manifests.insert(package.clone(), distribution);
                }
                Ok(None) => {}
                Err(e) if is_configuration_error(&e) => return Err(e),
                Err(e) => self
                    .progress_reporter
                    .report_warning(&format!("{}: {}", package, e)),
            }
        }
        Ok(manifests)
    }
}

fn is_configuration_error(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<FenceError>(),
        Some(FenceError::ManifestParseError { .. })
    )
}
