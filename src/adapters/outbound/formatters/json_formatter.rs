use crate::application::dto::CheckResponse;
use crate::boundary_analysis::services::ReportSection;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Serialize)]
struct Tool {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    tool: Tool,
    has_error: bool,
    package_count: usize,
    sections: &'a [ReportSection],
    unresolved_imports: &'a BTreeMap<String, BTreeSet<String>>,
    policy_cycle: Option<&'a [String]>,
}

/// JsonFormatter adapter producing a machine-readable report
///
/// Unlike the text report, the document is printed even for a clean run.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, response: &CheckResponse) -> Result<String> {
        let document = Document {
            tool: Tool {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
            has_error: response.has_error,
            package_count: response.package_count,
            sections: &response.sections,
            unresolved_imports: &response.unresolved_imports,
            policy_cycle: response.policy_cycle.as_deref(),
        };

        serde_json::to_string_pretty(&document).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary_analysis::domain::FindingKind;
    use crate::boundary_analysis::services::ReportEntry;

    #[test]
    fn test_clean_run_document() {
        let response = CheckResponse {
            package_count: 2,
            ..Default::default()
        };
        let output = JsonFormatter::new().format(&response).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["tool"]["name"], "import-fence");
        assert_eq!(value["has_error"], false);
        assert_eq!(value["package_count"], 2);
        assert_eq!(value["sections"], serde_json::json!([]));
        assert!(value["policy_cycle"].is_null());
    }

    #[test]
    fn test_findings_document() {
        let response = CheckResponse {
            has_error: true,
            package_count: 1,
            sections: vec![ReportSection {
                kind: FindingKind::RedundantDependencies,
                count: 1,
                entries: vec![ReportEntry {
                    package: "svc_a".to_string(),
                    dependencies: vec!["svc_c".to_string()],
                }],
            }],
            unresolved_imports: [(
                "svc_a".to_string(),
                ["missing_mod".to_string()].into_iter().collect(),
            )]
            .into_iter()
            .collect(),
            policy_cycle: Some(vec!["a".to_string(), "b".to_string()]),
        };
        let output = JsonFormatter::new().format(&response).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["has_error"], true);
        assert_eq!(value["sections"][0]["kind"], "redundant_dependencies");
        assert_eq!(value["sections"][0]["entries"][0]["package"], "svc_a");
        assert_eq!(
            value["sections"][0]["entries"][0]["dependencies"],
            serde_json::json!(["svc_c"])
        );
        assert_eq!(
            value["unresolved_imports"]["svc_a"],
            serde_json::json!(["missing_mod"])
        );
        assert_eq!(value["policy_cycle"], serde_json::json!(["a", "b"]));
    }
}
