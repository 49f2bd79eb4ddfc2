use crate::application::dto::CheckResponse;
use crate::shared::Result;

/// ReportFormatter port for rendering the outcome of a check run
pub trait ReportFormatter {
    /// Formats the check response
    ///
    /// # Returns
    /// The rendered document. An empty string means there is nothing to print.
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, response: &CheckResponse) -> Result<String>;
}
