use serde::Serialize;
use std::collections::BTreeSet;

/// Installable artifact identified by its install name.
///
/// `key` is the normalized install name. `importable_names` are the
/// top-level modules the artifact exposes; they frequently differ from the
/// install name (`PyYAML` installs `yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    key: String,
    name: String,
    declared_requirements: BTreeSet<String>,
    importable_names: BTreeSet<String>,
}

impl Distribution {
    pub fn new(
        name: impl Into<String>,
        declared_requirements: BTreeSet<String>,
        importable_names: BTreeSet<String>,
    ) -> Self {
        let name = name.into();
        Self {
            key: normalize_key(&name),
            name,
            declared_requirements,
            importable_names,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_requirements(&self) -> &BTreeSet<String> {
        &self.declared_requirements
    }

    pub fn importable_names(&self) -> &BTreeSet<String> {
        &self.importable_names
    }

    /// Whether a requirement name refers to this distribution
    pub fn matches(&self, requirement_name: &str) -> bool {
        normalize_key(requirement_name) == self.key
    }
}

/// Normalizes an install name: lowercase, runs of `-`, `_` and `.` become `-`
pub fn normalize_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                key.push('-');
            }
            in_separator = true;
        } else {
            key.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    key
}

/// Extracts the project name from a requirement specifier line.
///
/// Returns `None` for blank lines, comments, option lines (`-r`, `--index-url`)
/// and requirements that only apply to an extra (`; extra == "test"`).
///
/// # Examples
/// ```
/// use import_fence::boundary_analysis::domain::parse_requirement_name;
///
/// assert_eq!(parse_requirement_name("requests[socks]>=2.0"), Some("requests".to_string()));
/// assert_eq!(parse_requirement_name("pytest; extra == \"test\""), None);
/// ```
pub fn parse_requirement_name(line: &str) -> Option<String> {
    let line = line.split('#').next().unwrap_or_default().trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }

    if let Some((_, marker)) = line.split_once(';') {
        if marker.contains("extra") {
            return None;
        }
    }

    let name: String = line
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
