use super::edge_classifier::EdgeClassifier;
use crate::boundary_analysis::domain::{
    DependencyEdge, EdgeClassification, RootCache, RuntimeLayout, UNKNOWN_ROOT,
};
use crate::ports::outbound::ImportExtractor;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Classified dependency edges of one package
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    /// Local, external and unknown edges; internal and builtin edges are dropped
    pub edges: HashSet<DependencyEdge>,
    /// Dotted names of imports the extractor could not resolve
    pub unresolved_imports: BTreeSet<String>,
    /// Per-file extraction problems, already prefixed with the file path
    pub failures: Vec<String>,
}

/// Builds package-level edge sets from file-level imports.
pub struct GraphBuilder<'a, E: ImportExtractor> {
    extractor: &'a E,
    classifier: EdgeClassifier<'a>,
    root_cache: &'a RootCache,
}

impl<'a, E: ImportExtractor> GraphBuilder<'a, E> {
    pub fn new(
        extractor: &'a E,
        source_roots: &'a [PathBuf],
        runtime: &'a RuntimeLayout,
        root_cache: &'a RootCache,
    ) -> Self {
        Self {
            extractor,
            classifier: EdgeClassifier::new(source_roots, runtime),
            root_cache,
        }
    }

    /// Extracts, classifies and deduplicates the imports of a package's files.
    ///
    /// Each distinct file is handed to the extractor once. Extraction
    /// failures are recorded in the result and never abort the build.
    pub fn build(&self, package_name: &str, package_files: &[PathBuf]) -> PackageGraph {
        let mut graph = PackageGraph::default();
        let mut seen: HashSet<&Path> = HashSet::new();

        for file in package_files {
            if !seen.insert(file.as_path()) {
                continue;
            }

            let source = collapse_init(file);
            let source_root = self.root_cache.root_of(&source);

            let imports = match self.extractor.find_dependencies(file) {
                Ok(imports) => imports,
                Err(e) => {
                    graph.failures.push(format!("{}: {}", file.display(), e));
                    continue;
                }
            };
            graph.failures.extend(
                imports
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", file.display(), e)),
            );

            for target in imports.targets {
                if let Some(edge) = self.edge_for(package_name, &source, &source_root, target) {
                    if let Some(module) = edge.unresolved_module() {
                        graph.unresolved_imports.insert(module.to_string());
                    }
                    graph.edges.insert(edge);
                }
            }
        }

        graph
    }

    fn edge_for(
        &self,
        package_name: &str,
        source: &Path,
        source_root: &Path,
        target: PathBuf,
    ) -> Option<DependencyEdge> {
        let (target_root, target_file) = if target.starts_with(UNKNOWN_ROOT) {
            (PathBuf::from(UNKNOWN_ROOT), target)
        } else {
            let target_file = collapse_init(&target);
            (self.root_cache.root_of(&target_file), target_file)
        };

        let classification = self
            .classifier
            .classify(source_root, &target_root, &target_file);
        if matches!(
            classification,
            EdgeClassification::Internal | EdgeClassification::Builtin
        ) {
            return None;
        }

        let target_package = self.classifier.target_package(&target_root, &target_file);
        if target_package == package_name {
            return None;
        }

        Some(DependencyEdge::new(
            package_name,
            source.to_path_buf(),
            target_root,
            target_file,
            target_package,
            classification,
        ))
    }
}

/// `pkg/__init__.py` stands for the `pkg` directory
fn collapse_init(path: &Path) -> PathBuf {
    if path.file_name().is_some_and(|name| name == "__init__.py") {
        if let Some(parent) = path.parent() {
            return parent.to_path_buf();
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::ExtractedImports;
    use crate::shared::Result;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct StubExtractor {
        imports: HashMap<PathBuf, Vec<PathBuf>>,
        failing: HashSet<PathBuf>,
        calls: RefCell<Vec<PathBuf>>,
    }

    impl StubExtractor {
        fn new() -> Self {
            Self {
                imports: HashMap::new(),
                failing: HashSet::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn with_imports(mut self, file: &str, targets: &[&str]) -> Self {
            self.imports.insert(
                PathBuf::from(file),
                targets.iter().map(PathBuf::from).collect(),
            );
            self
        }

        fn with_failure(mut self, file: &str) -> Self {
            self.failing.insert(PathBuf::from(file));
            self
        }
    }

    impl ImportExtractor for StubExtractor {
        fn find_dependencies(&self, file_path: &Path) -> Result<ExtractedImports> {
            self.calls.borrow_mut().push(file_path.to_path_buf());
            if self.failing.contains(file_path) {
                anyhow::bail!("syntax error");
            }
            Ok(ExtractedImports {
                targets: self.imports.get(file_path).cloned().unwrap_or_default(),
                errors: Vec::new(),
            })
        }
    }

    const SRC: &str = "/repo/src";

    fn root_cache() -> RootCache {
        let cache = RootCache::new();
        for package in ["svc_a", "svc_b", "svc_c"] {
            let root = PathBuf::from(format!("{}/{}", SRC, package));
            for file in ["", "/__init__.py", "/api.py", "/models.py"] {
                cache.insert(
                    PathBuf::from(format!("{}/{}/{}{}", SRC, package, package, file)),
                    root.clone(),
                );
            }
        }
        cache
    }

    fn layout() -> RuntimeLayout {
        RuntimeLayout::new(
            vec![PathBuf::from("/usr")],
            ["sys".to_string()].into_iter().collect(),
        )
    }

    fn files(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_two_files_importing_same_target_yield_one_edge() {
        let extractor = StubExtractor::new()
            .with_imports("/repo/src/svc_a/svc_a/api.py", &["/repo/src/svc_b/svc_b/api.py"])
            .with_imports("/repo/src/svc_a/svc_a/models.py", &["/repo/src/svc_b/svc_b/models.py"]);
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);

        let graph = builder.build(
            "svc_a",
            &files(&["/repo/src/svc_a/svc_a/api.py", "/repo/src/svc_a/svc_a/models.py"]),
        );

        assert_eq!(graph.edges.len(), 1);
        let edge = graph.edges.iter().next().unwrap();
        assert_eq!(edge.target_package(), "svc_b");
        assert!(edge.is_local());
    }

    #[test]
    fn test_duplicate_input_files_are_processed_once() {
        let extractor = StubExtractor::new()
            .with_imports("/repo/src/svc_a/svc_a/api.py", &["/repo/src/svc_b/svc_b/api.py"]);
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);

        builder.build(
            "svc_a",
            &files(&["/repo/src/svc_a/svc_a/api.py", "/repo/src/svc_a/svc_a/api.py"]),
        );

        assert_eq!(extractor.calls.borrow().len(), 1);
    }

    #[test]
    fn test_internal_and_builtin_edges_are_dropped() {
        let extractor = StubExtractor::new().with_imports(
            "/repo/src/svc_a/svc_a/api.py",
            &[
                "/repo/src/svc_a/svc_a/models.py",
                "/usr/lib/python3.11/json/__init__.py",
                "UNKNOWN/sys",
            ],
        );
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);

        let graph = builder.build("svc_a", &files(&["/repo/src/svc_a/svc_a/api.py"]));
        assert!(graph.edges.is_empty());
        assert!(graph.unresolved_imports.is_empty());
    }

    #[test]
    fn test_unresolved_imports_are_kept_and_reported() {
        let extractor = StubExtractor::new()
            .with_imports("/repo/src/svc_a/svc_a/api.py", &["UNKNOWN/missing.module"]);
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);

        let graph = builder.build("svc_a", &files(&["/repo/src/svc_a/svc_a/api.py"]));
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.edges.iter().all(DependencyEdge::is_unknown));
        assert!(graph.unresolved_imports.contains("missing.module"));
    }

    #[test]
    fn test_unresolved_import_of_own_package_is_not_an_edge() {
        let extractor = StubExtractor::new()
            .with_imports("/repo/src/svc_a/svc_a/api.py", &["UNKNOWN/svc_a.generated"]);
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);

        let graph = builder.build("svc_a", &files(&["/repo/src/svc_a/svc_a/api.py"]));
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_init_file_source_collapses_to_directory() {
        let extractor = StubExtractor::new()
            .with_imports("/repo/src/svc_a/svc_a/__init__.py", &["/repo/src/svc_b/svc_b/__init__.py"]);
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);

        let graph = builder.build("svc_a", &files(&["/repo/src/svc_a/svc_a/__init__.py"]));
        let edge = graph.edges.iter().next().unwrap();
        assert_eq!(edge.source_file(), Path::new("/repo/src/svc_a/svc_a"));
        assert_eq!(edge.target_file(), Path::new("/repo/src/svc_b/svc_b"));
    }

    #[test]
    fn test_extraction_failure_is_recorded_and_build_continues() {
        let extractor = StubExtractor::new()
            .with_failure("/repo/src/svc_a/svc_a/api.py")
            .with_imports("/repo/src/svc_a/svc_a/models.py", &["/repo/src/svc_c/svc_c/api.py"]);
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);

        let graph = builder.build(
            "svc_a",
            &files(&["/repo/src/svc_a/svc_a/api.py", "/repo/src/svc_a/svc_a/models.py"]),
        );
        assert_eq!(graph.failures.len(), 1);
        assert!(graph.failures[0].contains("syntax error"));
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_building_twice_yields_identical_edges() {
        let extractor = StubExtractor::new()
            .with_imports(
                "/repo/src/svc_a/svc_a/api.py",
                &["/repo/src/svc_b/svc_b/api.py", "UNKNOWN/yaml"],
            )
            .with_imports("/repo/src/svc_a/svc_a/models.py", &["/repo/src/svc_c/svc_c/models.py"]);
        let (roots, layout, cache) = (vec![PathBuf::from(SRC)], layout(), root_cache());
        let builder = GraphBuilder::new(&extractor, &roots, &layout, &cache);
        let input = files(&["/repo/src/svc_a/svc_a/api.py", "/repo/src/svc_a/svc_a/models.py"]);

        let first = builder.build("svc_a", &input);
        let second = builder.build("svc_a", &input);
        assert_eq!(first.edges, second.edges);
        assert_eq!(first.edges.len(), 3);
    }
}
