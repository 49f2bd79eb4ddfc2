use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Directory names under which third-party distributions get installed
const THIRD_PARTY_DIRS: [&str; 2] = ["site-packages", "dist-packages"];

/// Shape of the interpreter installation used to tell builtin modules
/// apart from third-party ones.
///
/// Classification works on path shape: anything below a runtime prefix is
/// builtin unless a `site-packages`/`dist-packages` component appears in it.
#[derive(Debug, Clone, Default)]
pub struct RuntimeLayout {
    prefixes: Vec<PathBuf>,
    builtin_modules: HashSet<String>,
}

impl RuntimeLayout {
    pub fn new(prefixes: Vec<PathBuf>, builtin_modules: HashSet<String>) -> Self {
        let mut unique: Vec<PathBuf> = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            if !prefix.as_os_str().is_empty() && !unique.contains(&prefix) {
                unique.push(prefix);
            }
        }
        Self {
            prefixes: unique,
            builtin_modules,
        }
    }

    /// Layout with no prefixes and no builtin modules
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }

    /// Whether any component of the path is a third-party install directory
    pub fn is_third_party_path(path: &Path) -> bool {
        Self::third_party_dir(path).is_some()
    }

    /// Closest `site-packages`/`dist-packages` ancestor of a path
    pub fn third_party_dir(path: &Path) -> Option<&Path> {
        path.ancestors().find(|ancestor| {
            ancestor
                .file_name()
                .and_then(OsStr::to_str)
                .is_some_and(|name| THIRD_PARTY_DIRS.contains(&name))
        })
    }

    /// Whether a source root belongs to the runtime's standard installation
    pub fn is_builtin_root(&self, root: &Path) -> bool {
        !Self::is_third_party_path(root) && self.prefixes.iter().any(|p| root.starts_with(p))
    }

    /// Whether a module is compiled into the interpreter
    pub fn is_builtin_module(&self, module: &str) -> bool {
        let top_level = module.split('.').next().unwrap_or(module);
        self.builtin_modules.contains(top_level)
    }
}
