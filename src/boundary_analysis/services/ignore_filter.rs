use crate::shared::Result;
use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cell::RefCell;
use std::path::Path;

/// Maximum number of ignore patterns
const MAX_IGNORE_PATTERNS: usize = 64;

/// Maximum length of a single ignore pattern
const MAX_PATTERN_LENGTH: usize = 255;

/// IgnoreFilter - Skips source files matching glob-style ignore patterns
///
/// A pattern is matched against the file name and against the path relative
/// to the package root (with `/` separators). Patterns use glob syntax:
/// `*` matches any run of characters including `/`, `?` matches one
/// character and `[...]` matches a character class.
#[derive(Debug, Default)]
pub struct IgnoreFilter {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreFilter {
    /// Creates a new IgnoreFilter from raw pattern strings
    ///
    /// # Arguments
    /// * `patterns` - Pattern strings (e.g., "test_*.py", "*/migrations/*")
    ///
    /// # Errors
    /// - Too many patterns (> MAX_IGNORE_PATTERNS)
    /// - Invalid pattern format (length, control characters, wildcards only)
    /// - Malformed glob syntax (e.g. an unclosed `[`)
    pub fn new(patterns: Vec<String>) -> Result<Self> {
        if patterns.len() > MAX_IGNORE_PATTERNS {
            anyhow::bail!(
                "Too many ignore patterns: {} (maximum: {})",
                patterns.len(),
                MAX_IGNORE_PATTERNS
            );
        }

        let patterns = patterns
            .into_iter()
            .map(IgnorePattern::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Whether a file below `package_root` should be skipped
    pub fn is_ignored(&self, package_root: &Path, file: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let relative = file
            .strip_prefix(package_root)
            .unwrap_or(file)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        self.patterns
            .iter()
            .any(|p| p.matches(&file_name) || p.matches(&relative))
    }

    /// Returns the patterns that never matched a file
    ///
    /// Meaningful only after every package has been listed.
    pub fn get_unmatched_patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| !*p.matched.borrow())
            .map(|p| p.original.clone())
            .collect()
    }
}

/// A single ignore pattern with its compiled glob
#[derive(Debug)]
struct IgnorePattern {
    original: String,
    glob: GlobSet,
    matched: RefCell<bool>,
}

impl IgnorePattern {
    fn new(pattern: String) -> Result<Self> {
        validate_pattern(&pattern)?;

        let mut builder = GlobSetBuilder::new();
        builder.add(
            Glob::new(&pattern)
                .with_context(|| format!("Invalid ignore pattern '{}'", pattern))?,
        );
        let glob = builder
            .build()
            .with_context(|| format!("compile ignore pattern '{}'", pattern))?;

        Ok(Self {
            original: pattern,
            glob,
            matched: RefCell::new(false),
        })
    }

    fn matches(&self, candidate: &str) -> bool {
        let is_match = self.glob.is_match(candidate);
        if is_match {
            *self.matched.borrow_mut() = true;
        }
        is_match
    }
}

fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        anyhow::bail!("Ignore pattern cannot be empty");
    }

    if pattern.len() > MAX_PATTERN_LENGTH {
        anyhow::bail!(
            "Ignore pattern is too long: '{}' ({} chars). Maximum: {} chars",
            pattern,
            pattern.len(),
            MAX_PATTERN_LENGTH
        );
    }

    if let Some(ch) = pattern.chars().find(|c| c.is_control()) {
        anyhow::bail!(
            "Ignore pattern contains control character {:?} in pattern '{}'",
            ch,
            pattern
        );
    }

    if pattern.chars().all(|c| c == '*') {
        anyhow::bail!("Ignore pattern cannot contain only wildcards: '{}'", pattern);
    }

    Ok(())
}
