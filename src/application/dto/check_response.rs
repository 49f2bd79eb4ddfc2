use crate::boundary_analysis::services::ReportSection;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// CheckResponse - Outcome of one boundary check run
///
/// Every collection is already sorted, so formatters can render it as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResponse {
    /// True iff any section holds a finding
    pub has_error: bool,
    /// Number of analyzed packages
    pub package_count: usize,
    /// One section per non-empty finding category, in report order
    pub sections: Vec<ReportSection>,
    /// Package -> dotted names of imports that could not be resolved
    pub unresolved_imports: BTreeMap<String, BTreeSet<String>>,
    /// Members of a tolerated allow-list cycle (only set when cycles do not abort)
    pub policy_cycle: Option<Vec<String>>,
}

impl CheckResponse {
    /// Full text report, or `None` without findings
    pub fn report(&self) -> Option<String> {
        if !self.has_error {
            return None;
        }
        Some(
            self.sections
                .iter()
                .map(ReportSection::render)
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    }
}
