/// Integration tests for the application layer, run against real source trees on disk
mod test_utilities;

use import_fence::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use test_utilities::mocks::*;

type TestUseCase<IDX> = CheckBoundariesUseCase<
    FileSystemPackageLocator,
    PythonImportExtractor,
    FileSystemManifestReader,
    MockProgressReporter,
    IDX,
>;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn pyproject(name: &str, dependencies: &[&str]) -> String {
    let deps: Vec<String> = dependencies.iter().map(|d| format!("\"{}\"", d)).collect();
    format!(
        "[project]\nname = \"{}\"\nversion = \"0.1.0\"\ndependencies = [{}]\n",
        name,
        deps.join(", ")
    )
}

/// svc_a -> svc_b -> svc_c, plus a third-party `yaml` import in svc_a
fn workspace(svc_a_requirements: &[&str], svc_c_requirements: &[&str]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");

    write(&src, "svc_a/pyproject.toml", &pyproject("svc-a", svc_a_requirements));
    write(&src, "svc_a/svc_a/__init__.py", "");
    write(
        &src,
        "svc_a/svc_a/api.py",
        "import yaml\nfrom svc_b import client\n",
    );

    write(&src, "svc_b/pyproject.toml", &pyproject("svc-b", &[]));
    write(&src, "svc_b/svc_b/__init__.py", "");
    write(
        &src,
        "svc_b/svc_b/client.py",
        "from svc_c.models import Model\n",
    );

    write(&src, "svc_c/pyproject.toml", &pyproject("svc-c", svc_c_requirements));
    write(&src, "svc_c/svc_c/__init__.py", "");
    write(&src, "svc_c/svc_c/models.py", "class Model:\n    pass\n");

    let src = src.canonicalize().unwrap();
    (dir, src)
}

fn create_use_case<IDX: PackageIndex>(
    source_root: &Path,
    index: Option<IDX>,
    reporter: MockProgressReporter,
) -> TestUseCase<IDX> {
    let environment = PythonEnvironment::unavailable();
    let module_index = Arc::new(ModuleIndex::new());
    let locator =
        FileSystemPackageLocator::new(IgnoreFilter::new(vec![]).unwrap(), module_index.clone());
    let extractor =
        PythonImportExtractor::new(&environment, module_index, &[source_root.to_path_buf()])
            .unwrap();
    let manifest_reader = FileSystemManifestReader::new("python3").without_metadata_generation();

    CheckBoundariesUseCase::new(
        locator,
        extractor,
        manifest_reader,
        reporter,
        index,
        environment.runtime_layout(),
    )
}

fn dependency_map(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(package, allowed)| {
            (
                package.to_string(),
                allowed.iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_allowed_chain_has_no_findings() {
    let (_dir, src) = workspace(&[], &[]);
    let use_case = create_use_case::<MockPackageIndex>(&src, None, MockProgressReporter::new());

    let request = CheckRequest::new(vec![src.clone()]).with_dependency_map(dependency_map(&[
        ("svc_a", &["svc_b"]),
        ("svc_b", &["svc_c"]),
        ("svc_c", &[]),
    ]));
    let response = use_case.execute(request).await.unwrap();

    assert!(!response.has_error);
    assert_eq!(response.package_count, 3);
    assert!(response.report().is_none());
    assert_eq!(
        response.unresolved_imports["svc_a"].iter().collect::<Vec<_>>(),
        vec!["yaml"]
    );
}

#[tokio::test]
async fn test_disallowed_dependency_is_reported() {
    let (_dir, src) = workspace(&[], &[]);
    let use_case = create_use_case::<MockPackageIndex>(&src, None, MockProgressReporter::new());

    let request = CheckRequest::new(vec![src.clone()]).with_dependency_map(dependency_map(&[
        ("svc_a", &["svc_b"]),
        ("svc_b", &[]),
        ("svc_c", &[]),
    ]));
    let response = use_case.execute(request).await.unwrap();

    assert!(response.has_error);
    let report = response.report().unwrap();
    assert!(report.contains("Found 1 dependency violations:"));
    assert!(report.contains("svc_b is dependent on disallowed packages: svc_c"));
}

#[tokio::test]
async fn test_redundant_allowed_dependency_is_reported() {
    let (_dir, src) = workspace(&[], &[]);
    let use_case = create_use_case::<MockPackageIndex>(&src, None, MockProgressReporter::new());

    let request = CheckRequest::new(vec![src.clone()])
        .with_analysis_packages(Some(vec!["svc_a".to_string()]))
        .with_dependency_map(dependency_map(&[("svc_a", &["svc_b", "svc_c"])]));
    let response = use_case.execute(request).await.unwrap();

    assert!(response.has_error);
    assert_eq!(response.package_count, 1);
    assert_eq!(
        response.report().unwrap(),
        "Found 1 packages with redundant allowed dependencies:\n\
         Following dependencies of svc_a are redundant: svc_c"
    );
}

#[tokio::test]
async fn test_cyclic_allow_list_aborts_with_check_cyclic() {
    let (_dir, src) = workspace(&[], &[]);
    let use_case = create_use_case::<MockPackageIndex>(&src, None, MockProgressReporter::new());

    let request = CheckRequest::new(vec![src.clone()])
        .with_dependency_map(dependency_map(&[
            ("svc_a", &["svc_b"]),
            ("svc_b", &["svc_c"]),
            ("svc_c", &["svc_a"]),
        ]))
        .with_check_cyclic(true);
    let err = use_case.execute(request).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FenceError>(),
        Some(FenceError::PolicyCycle { .. })
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::ViolationsFound);
}

#[tokio::test]
async fn test_requirements_resolved_through_index() {
    let (_dir, src) = workspace(&["svc-b", "PyYAML"], &[]);
    let index = MockPackageIndex::new().with_distribution("PyYAML", &["yaml"]);
    let use_case = create_use_case(&src, Some(index.clone()), MockProgressReporter::new());

    let request = CheckRequest::new(vec![src.clone()])
        .with_dependency_map(dependency_map(&[
            ("svc_a", &["svc_b"]),
            ("svc_b", &["svc_c"]),
            ("svc_c", &[]),
        ]))
        .with_check_requirements(true)
        .with_ignore_third_party(false);
    let response = use_case.execute(request).await.unwrap();

    let report = response.report().unwrap();
    assert!(report.contains("Found 1 packages with missing requirements:"));
    assert!(report
        .contains("svc_b requirements must contain projects that export these packages: svc_c"));
    assert!(!report.contains("svc_a requirements"));
    // svc-b is local and never leaves the registry
    assert_eq!(index.get_call_count(), 1);
}

#[tokio::test]
async fn test_requirements_offline_keeps_install_name_mismatch() {
    let (_dir, src) = workspace(&["svc-b", "PyYAML"], &[]);
    let index = MockPackageIndex::new().with_distribution("PyYAML", &["yaml"]);
    let use_case = create_use_case(&src, Some(index.clone()), MockProgressReporter::new());

    let request = CheckRequest::new(vec![src.clone()])
        .with_analysis_packages(Some(vec!["svc_a".to_string()]))
        .with_dependency_map(dependency_map(&[("svc_a", &["svc_b"])]))
        .with_check_requirements(true);
    let response = use_case.execute(request).await.unwrap();

    let report = response.report().unwrap();
    assert!(report
        .contains("svc_a requirements must contain projects that export these packages: yaml"));
    assert!(report.contains("svc_a requirements should not contain PyYAML"));
    assert_eq!(index.get_call_count(), 0);
}

#[tokio::test]
async fn test_unreachable_index_is_called_once_per_run() {
    let (_dir, src) = workspace(&["svc-b", "PyYAML"], &["attrs"]);
    let inner = MockPackageIndex::unreachable();
    let index = CircuitBreakingPackageIndex::new(inner.clone());
    let reporter = MockProgressReporter::new();
    let use_case = create_use_case(&src, Some(index), reporter.clone());

    let request = CheckRequest::new(vec![src.clone()])
        .with_dependency_map(dependency_map(&[
            ("svc_a", &["svc_b"]),
            ("svc_b", &["svc_c"]),
            ("svc_c", &[]),
        ]))
        .with_check_requirements(true)
        .with_ignore_third_party(false);
    let response = use_case.execute(request).await.unwrap();

    assert_eq!(inner.get_call_count(), 1);
    assert!(response.has_error);
    let report = response.report().unwrap();
    assert!(report.contains("svc_a requirements should not contain PyYAML"));
    assert!(report.contains("svc_c requirements should not contain attrs"));
    assert_eq!(
        reporter
            .warnings()
            .iter()
            .filter(|w| w.contains("remote resolution is disabled"))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_ignore_patterns_skip_files() {
    let (_dir, src) = workspace(&[], &[]);
    let environment = PythonEnvironment::unavailable();
    let module_index = Arc::new(ModuleIndex::new());
    let locator = FileSystemPackageLocator::new(
        IgnoreFilter::new(vec!["client.py".to_string(), "nothing_*.py".to_string()]).unwrap(),
        module_index.clone(),
    );
    let extractor = PythonImportExtractor::new(&environment, module_index, &[src.clone()]).unwrap();
    let use_case = CheckBoundariesUseCase::new(
        locator,
        extractor,
        FileSystemManifestReader::new("python3").without_metadata_generation(),
        MockProgressReporter::new(),
        None::<MockPackageIndex>,
        environment.runtime_layout(),
    );

    let request = CheckRequest::new(vec![src.clone()]).with_dependency_map(dependency_map(&[
        ("svc_a", &["svc_b"]),
        ("svc_b", &[]),
        ("svc_c", &[]),
    ]));
    let response = use_case.execute(request).await.unwrap();

    assert!(!response.has_error);
    assert_eq!(
        use_case.package_locator().unmatched_ignore_patterns(),
        vec!["nothing_*.py".to_string()]
    );
}

#[tokio::test]
async fn test_data_directory_does_not_capture_stdlib_import() {
    let (dir, src) = workspace(&[], &[]);
    write(&src, "svc_b/logging/logging.yaml", "version: 1\n");
    write(&src, "svc_c/svc_c/log.py", "import logging\n");

    let stdlib = dir.path().join("python/lib/python3.11");
    write(&stdlib, "logging/__init__.py", "");
    let environment = PythonEnvironment::from_json(&format!(
        r#"{{"prefix": "{}", "stdlib": "{}", "sys_path": ["{}"]}}"#,
        dir.path().join("python").display(),
        stdlib.display(),
        stdlib.display()
    ))
    .unwrap();

    let module_index = Arc::new(ModuleIndex::new());
    let locator =
        FileSystemPackageLocator::new(IgnoreFilter::new(vec![]).unwrap(), module_index.clone());
    let extractor = PythonImportExtractor::new(&environment, module_index, &[src.clone()]).unwrap();
    let use_case = CheckBoundariesUseCase::new(
        locator,
        extractor,
        FileSystemManifestReader::new("python3").without_metadata_generation(),
        MockProgressReporter::new(),
        None::<MockPackageIndex>,
        environment.runtime_layout(),
    );

    let request = CheckRequest::new(vec![src.clone()]).with_dependency_map(dependency_map(&[
        ("svc_a", &["svc_b"]),
        ("svc_b", &["svc_c"]),
        ("svc_c", &[]),
    ]));
    let response = use_case.execute(request).await.unwrap();

    assert!(!response.has_error);
    assert!(response.report().is_none());
}

#[tokio::test]
async fn test_missing_source_root_is_an_application_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    let use_case = create_use_case::<MockPackageIndex>(&missing, None, MockProgressReporter::new());

    let err = use_case
        .execute(CheckRequest::new(vec![missing.clone()]))
        .await
        .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::ApplicationError);
}
