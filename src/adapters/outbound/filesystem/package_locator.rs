use crate::boundary_analysis::domain::{ModuleIndex, RootCache};
use crate::boundary_analysis::services::IgnoreFilter;
use crate::ports::outbound::PackageLocator;
use crate::shared::error::FenceError;
use crate::shared::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// Files whose presence makes a directory a package root
const MARKER_FILES: [&str; 2] = ["setup.py", "pyproject.toml"];

/// Directory names never descended into
const SKIPPED_DIRS: [&str; 6] = [
    "__pycache__",
    "site-packages",
    "dist-packages",
    "node_modules",
    "build",
    "dist",
];

/// FileSystemPackageLocator adapter for locating packages with walkdir
///
/// Nested package roots are allowed; a file belongs to the deepest root
/// above it. Preloading also registers every module name with the shared
/// `ModuleIndex`, which the import extractor consults.
pub struct FileSystemPackageLocator {
    ignore_filter: IgnoreFilter,
    module_index: Arc<ModuleIndex>,
}

impl FileSystemPackageLocator {
    pub fn new(ignore_filter: IgnoreFilter, module_index: Arc<ModuleIndex>) -> Self {
        Self {
            ignore_filter,
            module_index,
        }
    }

    /// Patterns that never matched while listing package files
    pub fn unmatched_ignore_patterns(&self) -> Vec<String> {
        self.ignore_filter.get_unmatched_patterns()
    }

    fn validate_source_root(root: &Path) -> Result<()> {
        if !root.exists() {
            return Err(FenceError::InvalidSourcePath {
                path: root.to_path_buf(),
                reason: "Directory does not exist".to_string(),
            }
            .into());
        }
        if !root.is_dir() {
            return Err(FenceError::InvalidSourcePath {
                path: root.to_path_buf(),
                reason: "Not a directory".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn register_modules(&self, package_root: &Path, root_cache: &RootCache) {
        let import_root = import_root(package_root);
        let setup_script = package_root.join("setup.py");

        for entry in walk(package_root) {
            let path = entry.path();
            if entry.file_type().is_dir() {
                if path == package_root {
                    continue;
                }
                root_cache.assign(path.to_path_buf(), package_root.to_path_buf());
                if !path.join("__init__.py").is_file() {
                    if let Some(module) = namespace_name(&import_root, path) {
                        self.module_index.insert_namespace(module, path.to_path_buf());
                    }
                }
                continue;
            }

            if !is_python_file(path) || path == setup_script {
                continue;
            }
            root_cache.assign(path.to_path_buf(), package_root.to_path_buf());
            if let Some(module) = ModuleIndex::module_name(&import_root, path) {
                self.module_index.insert(module, path.to_path_buf());
            }
        }
    }
}

impl PackageLocator for FileSystemPackageLocator {
    fn find_package_roots(&self, source_roots: &[PathBuf]) -> Result<BTreeSet<PathBuf>> {
        let mut roots = BTreeSet::new();
        for source_root in source_roots {
            Self::validate_source_root(source_root)?;
            roots.extend(
                walk(source_root)
                    .filter(|entry| entry.file_type().is_dir())
                    .filter(|entry| is_package_root(entry.path()))
                    .map(|entry| entry.into_path()),
            );
        }
        Ok(roots)
    }

    fn preload(&self, source_roots: &[PathBuf]) -> Result<RootCache> {
        let root_cache = RootCache::new();
        let mut package_roots: Vec<PathBuf> =
            self.find_package_roots(source_roots)?.into_iter().collect();
        // shallow roots first so deeper roots overwrite their entries
        package_roots.sort_by_key(|root| root.components().count());

        for package_root in &package_roots {
            self.register_modules(package_root, &root_cache);
        }
        Ok(root_cache)
    }

    fn list_package_files(&self, package_path: &Path) -> Result<Vec<PathBuf>> {
        if !package_path.is_dir() {
            return Err(FenceError::InvalidSourcePath {
                path: package_path.to_path_buf(),
                reason: "Package directory does not exist".to_string(),
            }
            .into());
        }

        let setup_script = package_path.join("setup.py");
        let mut files: Vec<PathBuf> = WalkDir::new(package_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !is_skipped_dir(entry)
                    && !(entry.file_type().is_dir()
                        && entry.path() != package_path
                        && is_package_root(entry.path()))
            })
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && is_python_file(entry.path()))
            .map(|entry| entry.into_path())
            .filter(|path| *path != setup_script)
            .filter(|path| !self.ignore_filter.is_ignored(package_path, path))
            .collect();
        files.sort();
        Ok(files)
    }
}

fn walk(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry))
        .filter_map(|e| e.ok())
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.ends_with(".egg-info") || SKIPPED_DIRS.contains(&name.as_ref())
}

fn is_package_root(dir: &Path) -> bool {
    MARKER_FILES.iter().any(|marker| dir.join(marker).is_file())
}

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

/// `src/` layout packages import from `<root>/src`
fn import_root(package_root: &Path) -> PathBuf {
    let src = package_root.join("src");
    if src.is_dir() && !src.join("__init__.py").is_file() {
        src
    } else {
        package_root.to_path_buf()
    }
}

/// Dotted name of a namespace directory (no `__init__.py`) below the import root
fn namespace_name(import_root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(import_root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let valid = !parts.is_empty()
        && parts.iter().all(|part| {
            part.chars().all(|c| c.is_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        });
    valid.then(|| parts.join("."))
}
