//! Reading installed-distribution metadata from a directory tree.
//!
//! Shared by the local manifest reader and the remote index, which both end
//! up with a directory that may hold `*.egg-info` / `*.dist-info` metadata
//! or only sources.

use crate::boundary_analysis::domain::parse_requirement_name;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata found in an `*.egg-info` or `*.dist-info` directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionMetadata {
    pub name: Option<String>,
    pub requirements: BTreeSet<String>,
    pub top_level: BTreeSet<String>,
}

/// Metadata directories directly below `dir` and below `dir/src`, sorted
pub fn find_metadata_dirs(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for base in [dir.to_path_buf(), dir.join("src")] {
        let Ok(entries) = fs::read_dir(&base) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let is_metadata = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".egg-info") || n.ends_with(".dist-info"));
            if is_metadata && path.is_dir() {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

/// Reads one metadata directory
///
/// `PKG-INFO` / `METADATA` give the name (and `Requires-Dist` lines),
/// `requires.txt` gives egg-style requirements, `top_level.txt` the
/// importable names.
pub fn read_metadata_dir(meta_dir: &Path) -> DistributionMetadata {
    let mut metadata = DistributionMetadata::default();

    for file in ["PKG-INFO", "METADATA"] {
        if let Ok(text) = fs::read_to_string(meta_dir.join(file)) {
            let (name, requirements) = parse_core_metadata(&text);
            metadata.name = metadata.name.or(name);
            metadata.requirements.extend(requirements);
        }
    }

    if let Ok(text) = fs::read_to_string(meta_dir.join("requires.txt")) {
        metadata.requirements.extend(parse_requires_txt(&text));
    }

    if let Ok(text) = fs::read_to_string(meta_dir.join("top_level.txt")) {
        metadata.top_level = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
    }

    metadata
}

/// `Name:` and the unconditional `Requires-Dist:` entries of core metadata
pub fn parse_core_metadata(text: &str) -> (Option<String>, BTreeSet<String>) {
    let mut name = None;
    let mut requirements = BTreeSet::new();

    for line in text.lines() {
        // headers end at the first blank line; the body is the description
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Name:") {
            name = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Requires-Dist:") {
            if let Some(requirement) = parse_requirement_name(value) {
                requirements.insert(requirement);
            }
        }
    }
    (name, requirements)
}

/// Requirements of the base section of an egg-style `requires.txt`
///
/// Sections such as `[test]` or `[:python_version < "3.8"]` are skipped.
pub fn parse_requires_txt(text: &str) -> BTreeSet<String> {
    text.lines()
        .take_while(|line| !line.trim_start().starts_with('['))
        .filter_map(parse_requirement_name)
        .collect()
}

/// Top-level importable names exposed by a directory.
///
/// Prefers `top_level.txt` from a metadata directory. Otherwise scans `dir`
/// (and `dir/src`) for directories holding `__init__.py` and for modules
/// other than `setup.py`.
pub fn read_importable_names(dir: &Path) -> BTreeSet<String> {
    for meta_dir in find_metadata_dirs(dir) {
        let top_level = read_metadata_dir(&meta_dir).top_level;
        if !top_level.is_empty() {
            return top_level;
        }
    }
    scan_top_level_packages(dir)
}

/// Importable names found by looking at the files of `dir` and `dir/src`
pub fn scan_top_level_packages(dir: &Path) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for base in [dir.to_path_buf(), dir.join("src")] {
        let Ok(entries) = fs::read_dir(&base) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            if path.is_dir() {
                if path.join("__init__.py").is_file() {
                    names.insert(file_name.to_string());
                }
            } else if let Some(stem) = file_name.strip_suffix(".py") {
                if stem != "setup" && stem != "conftest" {
                    names.insert(stem.to_string());
                }
            }
        }
    }
    names
}
