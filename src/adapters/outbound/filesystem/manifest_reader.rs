use super::distribution_layout::{
    find_metadata_dirs, read_importable_names, read_metadata_dir, scan_top_level_packages,
};
use crate::boundary_analysis::domain::{parse_requirement_name, Distribution};
use crate::ports::outbound::ManifestReader;
use crate::shared::error::FenceError;
use crate::shared::security::read_checked_file;
use crate::shared::Result;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// FileSystemManifestReader adapter for reading local package metadata
///
/// Sources are tried in order:
/// 1. `pyproject.toml` with a static `[project]` table
/// 2. an `*.egg-info` / `*.dist-info` directory already present in the package
/// 3. `setup.py egg_info` run into a temporary directory (if enabled)
pub struct FileSystemManifestReader {
    python: String,
    generate_metadata: bool,
}

impl FileSystemManifestReader {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            generate_metadata: true,
        }
    }

    /// Disables running `setup.py`; packages without static metadata stay unresolved
    pub fn without_metadata_generation(mut self) -> Self {
        self.generate_metadata = false;
        self
    }

    fn read_pyproject(&self, package_path: &Path) -> Result<Option<Distribution>> {
        let pyproject_path = package_path.join("pyproject.toml");
        if !pyproject_path.is_file() {
            return Ok(None);
        }

        let content = read_checked_file(&pyproject_path, "pyproject.toml").map_err(|e| {
            FenceError::ManifestParseError {
                path: pyproject_path.clone(),
                details: e.to_string(),
            }
        })?;
        let pyproject: toml::Value =
            toml::from_str(&content).map_err(|e| FenceError::ManifestParseError {
                path: pyproject_path.clone(),
                details: e.to_string(),
            })?;

        let Some(project) = pyproject.get("project") else {
            return Ok(None);
        };
        let Some(name) = project.get("name").and_then(|n| n.as_str()) else {
            return Ok(None);
        };

        let dynamic_dependencies = project
            .get("dynamic")
            .and_then(|d| d.as_array())
            .is_some_and(|fields| fields.iter().any(|f| f.as_str() == Some("dependencies")));
        if dynamic_dependencies {
            return Ok(None);
        }

        let requirements: BTreeSet<String> = project
            .get("dependencies")
            .and_then(|d| d.as_array())
            .map(|deps| {
                deps.iter()
                    .filter_map(|d| d.as_str())
                    .filter_map(parse_requirement_name)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(Distribution::new(
            name,
            requirements,
            read_importable_names(package_path),
        )))
    }

    fn read_egg_info(package_path: &Path, metadata_root: &Path) -> Option<Distribution> {
        find_metadata_dirs(metadata_root).into_iter().find_map(|meta_dir| {
            let metadata = read_metadata_dir(&meta_dir);
            let name = metadata.name?;
            let importable = if metadata.top_level.is_empty() {
                scan_top_level_packages(package_path)
            } else {
                metadata.top_level
            };
            Some(Distribution::new(name, metadata.requirements, importable))
        })
    }

    /// Runs `setup.py egg_info` with the package as working directory and
    /// the metadata written to a temporary directory removed on return
    fn generate_egg_info(&self, package_path: &Path) -> Result<Option<Distribution>> {
        if !package_path.join("setup.py").is_file() {
            return Ok(None);
        }

        let egg_base = TempDir::new()?;
        let status = Command::new(&self.python)
            .arg("setup.py")
            .arg("-q")
            .arg("egg_info")
            .arg("--egg-base")
            .arg(egg_base.path())
            .current_dir(package_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| anyhow::anyhow!("Failed to run {} setup.py: {}", self.python, e))?;

        if !status.success() {
            anyhow::bail!(
                "setup.py egg_info failed in {} ({})",
                package_path.display(),
                status
            );
        }
        Ok(Self::read_egg_info(package_path, egg_base.path()))
    }
}

impl ManifestReader for FileSystemManifestReader {
    fn read_distribution(&self, package_path: &Path) -> Result<Option<Distribution>> {
        if let Some(distribution) = self.read_pyproject(package_path)? {
            return Ok(Some(distribution));
        }
        if let Some(distribution) = Self::read_egg_info(package_path, package_path) {
            return Ok(Some(distribution));
        }
        if self.generate_metadata {
            return self.generate_egg_info(package_path);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn reader() -> FileSystemManifestReader {
        FileSystemManifestReader::new("python3").without_metadata_generation()
    }

    #[test]
    fn test_read_pyproject() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            r#"
[project]
name = "svc-b"
version = "1.0.0"
dependencies = ["PyYAML>=6", "requests[socks]", "pytest; extra == 'test'"]
"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("src/svc_b")).unwrap();
        fs::write(dir.path().join("src/svc_b/__init__.py"), "").unwrap();

        let dist = reader().read_distribution(dir.path()).unwrap().unwrap();
        assert_eq!(dist.name(), "svc-b");
        assert_eq!(dist.declared_requirements(), &names(&["PyYAML", "requests"]));
        assert_eq!(dist.importable_names(), &names(&["svc_b"]));
    }

    #[test]
    fn test_invalid_pyproject_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "invalid toml [[[").unwrap();

        let err = reader().read_distribution(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse package manifest"));
    }

    #[test]
    fn test_pyproject_without_project_table_falls_back_to_egg_info() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[build-system]\nrequires = []\n").unwrap();
        fs::write(dir.path().join("setup.py"), "").unwrap();
        let meta = dir.path().join("svc_a.egg-info");
        fs::create_dir_all(&meta).unwrap();
        fs::write(meta.join("PKG-INFO"), "Name: svc-a\n").unwrap();
        fs::write(meta.join("requires.txt"), "svc-b\n").unwrap();

        let dist = reader().read_distribution(dir.path()).unwrap().unwrap();
        assert_eq!(dist.name(), "svc-a");
        assert_eq!(dist.declared_requirements(), &names(&["svc-b"]));
    }

    #[test]
    fn test_setup_py_without_metadata_is_unresolved() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("setup.py"), "from setuptools import setup\n").unwrap();

        assert!(reader().read_distribution(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_dynamic_dependencies_skip_pyproject() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"svc-c\"\ndynamic = [\"dependencies\"]\n",
        )
        .unwrap();

        assert!(reader().read_distribution(dir.path()).unwrap().is_none());
    }
}
