use crate::boundary_analysis::domain::{EdgeClassification, RuntimeLayout, UNKNOWN_ROOT};
use std::path::{Path, PathBuf};

/// Classifies raw file-level import edges and derives package names.
pub struct EdgeClassifier<'a> {
    local_source_roots: &'a [PathBuf],
    runtime: &'a RuntimeLayout,
}

impl<'a> EdgeClassifier<'a> {
    pub fn new(local_source_roots: &'a [PathBuf], runtime: &'a RuntimeLayout) -> Self {
        Self {
            local_source_roots,
            runtime,
        }
    }

    /// Classifies the edge `source_root -> (target_root, target_file)`.
    ///
    /// Checks run in this order: unresolved, internal, third-party path
    /// shape, local source roots, runtime installation, and external.
    /// An unresolved import whose module is compiled into the interpreter
    /// is builtin rather than unknown.
    pub fn classify(
        &self,
        source_root: &Path,
        target_root: &Path,
        target_file: &Path,
    ) -> EdgeClassification {
        if target_root == Path::new(UNKNOWN_ROOT) {
            let module = unresolved_module(target_file);
            if self.runtime.is_builtin_module(module) {
                return EdgeClassification::Builtin;
            }
            return EdgeClassification::Unknown;
        }

        if target_root == source_root {
            return EdgeClassification::Internal;
        }

        if RuntimeLayout::is_third_party_path(target_file) {
            return EdgeClassification::External;
        }

        if self.is_local(target_file) {
            return EdgeClassification::Local;
        }

        if self.runtime.is_builtin_root(target_root) {
            return EdgeClassification::Builtin;
        }

        EdgeClassification::External
    }

    fn is_local(&self, target_file: &Path) -> bool {
        self.local_source_roots
            .iter()
            .any(|root| target_file.starts_with(root))
    }

    /// Package-level name of an edge target.
    ///
    /// - unresolved imports: first segment of the dotted module name
    /// - files below `site-packages`: first path segment beneath it, with a
    ///   module suffix stripped (`six.py` is `six`)
    /// - everything else: the directory name of the target root
    pub fn target_package(&self, target_root: &Path, target_file: &Path) -> String {
        if target_root == Path::new(UNKNOWN_ROOT) {
            let module = unresolved_module(target_file);
            return module.split('.').next().unwrap_or(module).to_string();
        }

        if let Some(install_dir) = RuntimeLayout::third_party_dir(target_file) {
            if let Some(first) = target_file
                .strip_prefix(install_dir)
                .ok()
                .and_then(|rest| rest.components().next())
            {
                return strip_module_suffix(&first.as_os_str().to_string_lossy());
            }
        }

        target_root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| target_root.to_string_lossy().into_owned())
    }
}

fn unresolved_module(target_file: &Path) -> &str {
    target_file
        .strip_prefix(UNKNOWN_ROOT)
        .ok()
        .and_then(|rest| rest.to_str())
        .unwrap_or_default()
}

/// `six.py` -> `six`, `_yaml.cpython-311-x86_64-linux-gnu.so` -> `_yaml`
fn strip_module_suffix(segment: &str) -> String {
    for suffix in [".py", ".pyc", ".so", ".pyd"] {
        if let Some(stem) = segment.strip_suffix(suffix) {
            return stem.split('.').next().unwrap_or(stem).to_string();
        }
    }
    segment.to_string()
}
