use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// Run-scoped index of dotted module names found below local package roots.
///
/// Filled while preloading. Regular modules (`.py` files and packages with
/// `__init__.py`) are consulted by import extraction before the interpreter
/// search path. Namespace directories are kept apart and only consulted
/// once no regular module of that name exists anywhere, so a plain data
/// directory never shadows a real module.
#[derive(Debug, Default)]
pub struct ModuleIndex {
    modules: DashMap<String, PathBuf>,
    namespaces: DashMap<String, PathBuf>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module; the first registration of a name wins
    pub fn insert(&self, module: impl Into<String>, path: PathBuf) {
        self.modules.entry(module.into()).or_insert(path);
    }

    /// Registers a directory without `__init__.py`; the first registration wins
    pub fn insert_namespace(&self, module: impl Into<String>, dir: PathBuf) {
        self.namespaces.entry(module.into()).or_insert(dir);
    }

    /// Regular module registered under `module`
    pub fn resolve(&self, module: &str) -> Option<PathBuf> {
        self.modules.get(module).map(|entry| entry.value().clone())
    }

    pub fn resolve_namespace(&self, module: &str) -> Option<PathBuf> {
        self.namespaces.get(module).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Dotted module name for a file relative to an import root
    ///
    /// `pkg/__init__.py` maps to `pkg`, `pkg/mod.py` to `pkg.mod`.
    /// Returns `None` for files that are not Python modules.
    pub fn module_name(import_root: &Path, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(import_root).ok()?;
        let mut parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let last = parts.pop()?;
        let stem = last.strip_suffix(".py")?;
        if stem != "__init__" {
            parts.push(stem.to_string());
        }
        if parts.is_empty() || parts.iter().any(|p| p.is_empty() || p.contains('.')) {
            return None;
        }
        Some(parts.join("."))
    }
}
