use crate::application::dto::CheckResponse;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// TextFormatter adapter rendering the aggregated plain-text report
///
/// A clean run renders to an empty string so nothing is printed.
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, response: &CheckResponse) -> Result<String> {
        Ok(response.report().unwrap_or_default())
    }
}
