use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// Run-scoped memoization of "file path -> containing source root".
///
/// Entries are written at most once per key. A miss walks up from the file
/// through every directory that holds an `__init__.py`; the first directory
/// without one is the root.
#[derive(Debug, Default)]
pub struct RootCache {
    roots: DashMap<PathBuf, PathBuf>,
}

impl RootCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the root of a file unless one is already known
    pub fn insert(&self, path: PathBuf, root: PathBuf) {
        self.roots.entry(path).or_insert(root);
    }

    /// Records the root of a file, replacing a previous entry
    ///
    /// Used by preloading, where a deeper package root must win over the
    /// enclosing one.
    pub fn assign(&self, path: PathBuf, root: PathBuf) {
        self.roots.insert(path, root);
    }

    pub fn get(&self, path: &Path) -> Option<PathBuf> {
        self.roots.get(path).map(|entry| entry.value().clone())
    }

    /// Returns the source root of a path, computing and caching it on a miss
    pub fn root_of(&self, path: &Path) -> PathBuf {
        if let Some(root) = self.get(path) {
            return root;
        }
        self.roots
            .entry(path.to_path_buf())
            .or_insert_with(|| detect_root(path))
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn detect_root(path: &Path) -> PathBuf {
    let mut dir = if path.is_dir() {
        path
    } else {
        match path.parent() {
            Some(parent) => parent,
            None => return path.to_path_buf(),
        }
    };

    while dir.join("__init__.py").is_file() {
        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }
    dir.to_path_buf()
}
