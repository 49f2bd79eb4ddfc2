/// End-to-end tests for config file loading and CLI option merging.
///
/// These tests exercise the full flow from config file on disk through CLI invocation
/// to correct output, using `assert_cmd` and `tempfile` for isolated test environments.
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `app` imports `lib` and the third-party `yaml`; `lib` imports nothing.
fn create_source_tree(root: &Path, app_requirements: &str) {
    write(
        root,
        "src/app/pyproject.toml",
        &format!(
            "[project]\nname = \"app\"\ndependencies = [{}]\n",
            app_requirements
        ),
    );
    write(root, "src/app/app/__init__.py", "");
    write(root, "src/app/app/main.py", "import yaml\nimport lib.util\n");

    write(
        root,
        "src/lib/pyproject.toml",
        "[project]\nname = \"lib\"\ndependencies = []\n",
    );
    write(root, "src/lib/lib/__init__.py", "");
    write(root, "src/lib/lib/util.py", "VALUE = 1\n");
}

/// Write a config file at the specified path.
fn write_config(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

const BASE_CONFIG: &str = "source_paths: [src]\npython: /nonexistent/python-for-tests\n";

// ============================================================================
// Config discovery
// ============================================================================

#[test]
fn test_config_discovered_in_project_directory() {
    let dir = TempDir::new().unwrap();
    create_source_tree(dir.path(), "");
    write_config(
        &dir.path().join("import-fence.config.yml"),
        &format!("{}dependency_map:\n  app: [lib]\n  lib: []\n", BASE_CONFIG),
    );

    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(0);
}

#[test]
fn test_explicit_config_resolves_source_paths_against_its_directory() {
    let project = TempDir::new().unwrap();
    create_source_tree(project.path(), "");

    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("fence.yml");
    write_config(
        &config_path,
        &format!(
            "source_paths: [{}]\npython: /nonexistent/python-for-tests\ndependency_map:\n  app: []\n",
            project.path().join("src").display()
        ),
    );

    cargo_bin_cmd!("import-fence")
        .args([
            "-p",
            config_dir.path().to_str().unwrap(),
            "-c",
            config_path.to_str().unwrap(),
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "app is dependent on disallowed packages: lib",
        ));
}

#[test]
fn test_explicit_config_not_found() {
    let dir = TempDir::new().unwrap();
    cargo_bin_cmd!("import-fence")
        .args([
            "-p",
            dir.path().to_str().unwrap(),
            "-c",
            "/nonexistent/fence.yml",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to read config file"));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_invalid_config_is_application_error() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir.path().join("import-fence.config.yml"),
        "check_cyclic: true\n",
    );

    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("source_paths"));
}

#[test]
fn test_unknown_fields_warn() {
    let dir = TempDir::new().unwrap();
    create_source_tree(dir.path(), "");
    write_config(
        &dir.path().join("import-fence.config.yml"),
        &format!("{}dependency_map:\n  app: [lib]\nfrobnicate: true\n", BASE_CONFIG),
    );

    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(0)
        .stderr(predicate::str::contains(
            "Unknown config field 'frobnicate'",
        ));
}

#[test]
fn test_unknown_analysis_package() {
    let dir = TempDir::new().unwrap();
    create_source_tree(dir.path(), "");
    write_config(
        &dir.path().join("import-fence.config.yml"),
        &format!("{}analysis_packages: [missing_pkg]\n", BASE_CONFIG),
    );

    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains(
            "Package 'missing_pkg' not found under any source root",
        ));
}

#[test]
fn test_missing_source_path() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir.path().join("import-fence.config.yml"),
        "source_paths: [does-not-exist]\npython: /nonexistent/python-for-tests\n",
    );

    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid source path"));
}

// ============================================================================
// CLI option merging
// ============================================================================

#[test]
fn test_check_cyclic_from_config() {
    let dir = TempDir::new().unwrap();
    create_source_tree(dir.path(), "");
    write_config(
        &dir.path().join("import-fence.config.yml"),
        &format!(
            "{}check_cyclic: true\ndependency_map:\n  app: [lib]\n  lib: [app]\n",
            BASE_CONFIG
        ),
    );

    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Packages in cycle: app, lib"));
}

#[test]
fn test_check_requirements_flag_offline() {
    let dir = TempDir::new().unwrap();
    create_source_tree(dir.path(), "\"lib\", \"PyYAML\"");
    write_config(
        &dir.path().join("import-fence.config.yml"),
        &format!("{}dependency_map:\n  app: [lib]\n  lib: []\n", BASE_CONFIG),
    );

    cargo_bin_cmd!("import-fence")
        .args([
            "-p",
            dir.path().to_str().unwrap(),
            "--check-requirements",
            "--offline",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "app requirements must contain projects that export these packages: yaml",
        ))
        .stdout(predicate::str::contains(
            "app requirements should not contain PyYAML",
        ));
}

#[test]
fn test_check_requirements_from_config() {
    let dir = TempDir::new().unwrap();
    create_source_tree(dir.path(), "\"lib\"");
    write_config(
        &dir.path().join("import-fence.config.yml"),
        &format!(
            "{}check_requirements: true\ndependency_map:\n  app: [lib]\n  lib: []\n",
            BASE_CONFIG
        ),
    );

    // the only third-party import is undeclared, so the index is never asked
    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "app requirements must contain projects that export these packages: yaml",
        ))
        .stdout(predicate::str::contains("should not contain").not());
}

#[test]
fn test_unmatched_ignore_pattern_warns() {
    let dir = TempDir::new().unwrap();
    create_source_tree(dir.path(), "");
    write_config(
        &dir.path().join("import-fence.config.yml"),
        &format!(
            "{}ignore:\n  - \"main.py\"\n  - \"nothing_*.py\"\ndependency_map:\n  app: []\n  lib: []\n",
            BASE_CONFIG
        ),
    );

    // main.py holds app's only import of lib, so ignoring it leaves no violation
    cargo_bin_cmd!("import-fence")
        .args(["-p", dir.path().to_str().unwrap()])
        .assert()
        .code(0)
        .stderr(predicate::str::contains(
            "Ignore pattern 'nothing_*.py' did not match any source file",
        ));
}
