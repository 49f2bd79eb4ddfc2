use super::environment::PythonEnvironment;
use crate::boundary_analysis::domain::{ModuleIndex, UNKNOWN_ROOT};
use crate::ports::outbound::{ExtractedImports, ImportExtractor};
use crate::shared::security::read_checked_file;
use crate::shared::Result;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tree_sitter::{Node, Parser};

/// One import statement as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
enum ImportRequest {
    /// `import a.b`
    Module(String),
    /// `from ..a import b, c`; `names` is empty for `import *`
    From {
        level: usize,
        module: Option<String>,
        names: Vec<String>,
    },
}

/// PythonImportExtractor adapter built on tree-sitter-python
///
/// Imports anywhere in the file count, including those inside functions and
/// `try` blocks. Syntax errors are reported and the remaining imports are
/// still extracted.
pub struct PythonImportExtractor {
    parser: RefCell<Parser>,
    module_index: Arc<ModuleIndex>,
    search_paths: Vec<PathBuf>,
    builtin_modules: HashSet<String>,
}

impl PythonImportExtractor {
    /// Creates an extractor resolving against the interpreter's search path,
    /// followed by the local source roots
    ///
    /// # Errors
    /// Returns an error if the Python grammar cannot be loaded
    pub fn new(
        environment: &PythonEnvironment,
        module_index: Arc<ModuleIndex>,
        source_roots: &[PathBuf],
    ) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(tree_sitter_python::language())?;

        let mut search_paths: Vec<PathBuf> = environment.search_paths().to_vec();
        for root in source_roots {
            if !search_paths.contains(root) {
                search_paths.push(root.clone());
            }
        }

        Ok(Self {
            parser: RefCell::new(parser),
            module_index,
            search_paths,
            builtin_modules: environment.builtin_modules(),
        })
    }

    fn resolve_request(
        &self,
        request: &ImportRequest,
        package_dir: &Path,
        errors: &mut Vec<String>,
    ) -> Vec<PathBuf> {
        match request {
            ImportRequest::Module(module) => vec![self.resolve(module)],
            ImportRequest::From {
                level: 0,
                module: Some(module),
                names,
            } => {
                let submodules: Vec<PathBuf> = names
                    .iter()
                    .filter_map(|name| self.lookup(&format!("{}.{}", module, name)))
                    .collect();
                // names that are not submodules are attributes of the module itself
                if !names.is_empty() && submodules.len() == names.len() {
                    submodules
                } else {
                    let mut targets = submodules;
                    targets.push(self.resolve(module));
                    targets
                }
            }
            ImportRequest::From {
                level,
                module,
                names,
            } => {
                let Some(base) = relative_base(package_dir, *level) else {
                    errors.push(format!("relative import beyond top-level package: {}", request));
                    return Vec::new();
                };
                let (module_target, submodule_dir) = match module {
                    Some(module) => {
                        let parts: Vec<&str> = module.split('.').collect();
                        let Some(target) = find_module(base, &parts) else {
                            errors.push(format!("unresolved relative import: {}", request));
                            return Vec::new();
                        };
                        let dir = package_dir_of(&target);
                        (target, dir)
                    }
                    None => {
                        let init = base.join("__init__.py");
                        let target = if init.is_file() { init } else { base.to_path_buf() };
                        (target, Some(base.to_path_buf()))
                    }
                };

                let mut targets: Vec<PathBuf> = match &submodule_dir {
                    Some(dir) => names
                        .iter()
                        .filter_map(|name| find_module(dir, &[name.as_str()]))
                        .collect(),
                    None => Vec::new(),
                };
                if names.is_empty() || targets.len() < names.len() {
                    targets.push(module_target);
                }
                targets
            }
        }
    }

    /// Resolved target of an absolute module, or `UNKNOWN/<module>`
    fn resolve(&self, module: &str) -> PathBuf {
        self.lookup(module)
            .unwrap_or_else(|| Path::new(UNKNOWN_ROOT).join(module))
    }

    fn lookup(&self, module: &str) -> Option<PathBuf> {
        let top_level = module.split('.').next().unwrap_or(module);
        if self.builtin_modules.contains(top_level) {
            return Some(Path::new(UNKNOWN_ROOT).join(module));
        }
        let parts: Vec<&str> = module.split('.').collect();
        // regular modules anywhere on the path beat namespace portions
        self.module_index
            .resolve(module)
            .or_else(|| {
                self.search_paths
                    .iter()
                    .find_map(|dir| find_regular_module(dir, &parts))
            })
            .or_else(|| self.module_index.resolve_namespace(module))
            .or_else(|| {
                self.search_paths
                    .iter()
                    .find_map(|dir| find_namespace_dir(dir, &parts))
            })
    }
}

impl ImportExtractor for PythonImportExtractor {
    fn find_dependencies(&self, file_path: &Path) -> Result<ExtractedImports> {
        let source = read_checked_file(file_path, "source file")?;
        let tree = self
            .parser
            .borrow_mut()
            .parse(&source, None)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse file: {}", file_path.display()))?;

        let root = tree.root_node();
        let mut errors = Vec::new();
        if root.has_error() {
            if let Some(line) = first_error_line(root) {
                errors.push(format!("syntax error at line {}", line));
            }
        }

        let mut requests = Vec::new();
        collect_imports(root, source.as_bytes(), &mut requests);

        let package_dir = file_path.parent().unwrap_or(Path::new(""));
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for request in &requests {
            for target in self.resolve_request(request, package_dir, &mut errors) {
                if seen.insert(target.clone()) {
                    targets.push(target);
                }
            }
        }

        Ok(ExtractedImports { targets, errors })
    }
}

impl std::fmt::Display for ImportRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportRequest::Module(module) => write!(f, "import {}", module),
            ImportRequest::From {
                level,
                module,
                names,
            } => {
                let names = if names.is_empty() {
                    "*".to_string()
                } else {
                    names.join(", ")
                };
                write!(
                    f,
                    "from {}{} import {}",
                    ".".repeat(*level),
                    module.as_deref().unwrap_or_default(),
                    names
                )
            }
        }
    }
}

fn collect_imports(node: Node, source: &[u8], requests: &mut Vec<ImportRequest>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_statement" => {
                let mut name_cursor = child.walk();
                for name in child.children_by_field_name("name", &mut name_cursor) {
                    if let Some(module) = imported_name(name, source) {
                        requests.push(ImportRequest::Module(module));
                    }
                }
            }
            "import_from_statement" => {
                if let Some(request) = from_import(child, source) {
                    requests.push(request);
                }
            }
            _ => collect_imports(child, source, requests),
        }
    }
}

fn from_import(node: Node, source: &[u8]) -> Option<ImportRequest> {
    let module_node = node.child_by_field_name("module_name")?;
    let (level, module) = if module_node.kind() == "relative_import" {
        let mut level = 0;
        let mut module = None;
        let mut cursor = module_node.walk();
        for part in module_node.children(&mut cursor) {
            match part.kind() {
                "import_prefix" => level = text(part, source).matches('.').count(),
                "dotted_name" => module = Some(text(part, source)),
                _ => {}
            }
        }
        (level, module)
    } else {
        (0, Some(text(module_node, source)))
    };

    let mut cursor = node.walk();
    let names = node
        .children_by_field_name("name", &mut cursor)
        .filter_map(|name| imported_name(name, source))
        .collect();

    Some(ImportRequest::From {
        level,
        module,
        names,
    })
}

/// Name of a `dotted_name` or of the original side of an `aliased_import`
fn imported_name(node: Node, source: &[u8]) -> Option<String> {
    let name_node = if node.kind() == "aliased_import" {
        node.child_by_field_name("name")?
    } else {
        node
    };
    let name = text(name_node, source);
    (!name.is_empty()).then_some(name)
}

fn text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source)
        .unwrap_or_default()
        .split_whitespace()
        .collect()
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_line)
}

/// Directory a relative import of the given level starts from
fn relative_base(package_dir: &Path, level: usize) -> Option<&Path> {
    let mut base = package_dir;
    for _ in 1..level {
        base = base.parent()?;
    }
    Some(base)
}

/// Directory the submodules of a resolved target live in; plain modules have none
fn package_dir_of(target: &Path) -> Option<PathBuf> {
    if target.file_name().is_some_and(|name| name == "__init__.py") {
        target.parent().map(Path::to_path_buf)
    } else if target.is_dir() {
        Some(target.to_path_buf())
    } else {
        None
    }
}

/// Looks `a.b.c` up below one directory, falling back to a namespace directory
fn find_module(dir: &Path, parts: &[&str]) -> Option<PathBuf> {
    find_regular_module(dir, parts).or_else(|| find_namespace_dir(dir, parts))
}

/// Tries `a/b/c/__init__.py`, `a/b/c.py` and an extension module `a/b/c.*.so`
fn find_regular_module(dir: &Path, parts: &[&str]) -> Option<PathBuf> {
    let (last, packages) = parts.split_last()?;
    let mut current = dir.to_path_buf();
    for part in packages {
        current.push(part);
        if !current.is_dir() {
            return None;
        }
    }

    let package = current.join(last);
    let init = package.join("__init__.py");
    if init.is_file() {
        return Some(init);
    }
    let module = current.join(format!("{}.py", last));
    if module.is_file() {
        return Some(module);
    }
    find_extension_module(&current, last)
}

fn find_namespace_dir(dir: &Path, parts: &[&str]) -> Option<PathBuf> {
    let namespace = parts.iter().fold(dir.to_path_buf(), |path, part| path.join(part));
    namespace.is_dir().then_some(namespace)
}

fn find_extension_module(dir: &Path, name: &str) -> Option<PathBuf> {
    let prefix = format!("{}.", name);
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| {
                    n.starts_with(&prefix) && (n.ends_with(".so") || n.ends_with(".pyd"))
                })
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}
