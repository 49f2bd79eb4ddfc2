use crate::boundary_analysis::domain::{FindingKind, FindingSet};
use crate::shared::error::FenceError;
use crate::shared::Result;
use serde::Serialize;
use std::collections::btree_map::{BTreeMap, Entry};

/// One affected package inside a report section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub package: String,
    pub dependencies: Vec<String>,
}

/// Sorted view of one finding category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub kind: FindingKind,
    pub count: usize,
    pub entries: Vec<ReportEntry>,
}

impl ReportSection {
    /// Header line followed by one line per package
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        lines.push(header(self.kind, self.count));
        for entry in &self.entries {
            lines.push(entry_line(self.kind, &entry.package, &entry.dependencies.join(", ")));
        }
        lines.join("\n")
    }
}

fn header(kind: FindingKind, count: usize) -> String {
    match kind {
        FindingKind::InvalidDependencies => format!("Found {} dependency violations:", count),
        FindingKind::RedundantDependencies => format!(
            "Found {} packages with redundant allowed dependencies:",
            count
        ),
        FindingKind::MissingRequirements => {
            format!("Found {} packages with missing requirements:", count)
        }
        FindingKind::ExtraRequirements => {
            format!("Found {} packages with extra requirements:", count)
        }
    }
}

fn entry_line(kind: FindingKind, package: &str, names: &str) -> String {
    match kind {
        FindingKind::InvalidDependencies => {
            format!("{} is dependent on disallowed packages: {}", package, names)
        }
        FindingKind::RedundantDependencies => {
            format!("Following dependencies of {} are redundant: {}", package, names)
        }
        FindingKind::MissingRequirements => format!(
            "{} requirements must contain projects that export these packages: {}",
            package, names
        ),
        FindingKind::ExtraRequirements => {
            format!("{} requirements should not contain {}", package, names)
        }
    }
}

/// Collects finding sets from every analyzer and renders one report.
///
/// Sets of the same kind are merged; rendering sorts categories by kind,
/// packages by name and names alphabetically, so the text does not depend
/// on the order findings were added in.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    findings: BTreeMap<FindingKind, FindingSet>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, findings: FindingSet) {
        match self.findings.entry(findings.kind()) {
            Entry::Occupied(mut existing) => {
                if let Err(rejected) = existing.get_mut().merge(findings) {
                    debug_assert_eq!(
                        rejected.kind(),
                        *existing.key(),
                        "finding set stored under the wrong kind"
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(findings);
            }
        }
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = FindingSet>) {
        for set in findings {
            self.add(set);
        }
    }

    /// True iff any finding set holds at least one finding
    pub fn has_error(&self) -> bool {
        self.findings.values().any(|set| !set.is_empty())
    }

    /// Sorted sections for every non-empty category
    pub fn sections(&self) -> Vec<ReportSection> {
        self.findings
            .values()
            .filter(|set| !set.is_empty())
            .map(|set| {
                let mut entries: Vec<ReportEntry> = set
                    .by_package()
                    .into_iter()
                    .map(|(package, names)| {
                        let mut dependencies: Vec<String> = names.into_iter().collect();
                        dependencies.sort();
                        ReportEntry {
                            package,
                            dependencies,
                        }
                    })
                    .collect();
                entries.sort_by(|a, b| a.package.cmp(&b.package));

                let count = match set {
                    FindingSet::InvalidDependencies(edges) => edges.len(),
                    _ => entries.len(),
                };
                ReportSection {
                    kind: set.kind(),
                    count,
                    entries,
                }
            })
            .collect()
    }

    /// One formatted block per non-empty category
    pub fn error_messages(&self) -> Vec<String> {
        self.sections().iter().map(ReportSection::render).collect()
    }

    /// Every block joined by a blank line, or `None` without findings
    pub fn report(&self) -> Option<String> {
        if !self.has_error() {
            return None;
        }
        Some(self.error_messages().join("\n\n"))
    }

    /// Raises a single failure carrying the full report when anything was found
    pub fn into_result(self) -> Result<()> {
        match self.report() {
            Some(report) => Err(FenceError::BoundaryViolations { report }.into()),
            None => Ok(()),
        }
    }
}
