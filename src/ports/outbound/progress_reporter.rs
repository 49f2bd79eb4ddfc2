/// ProgressReporter port for diagnostics during a check run
///
/// This is the only channel the application layer logs through. Adapters
/// decide where messages go (stderr, a buffer in tests).
pub trait ProgressReporter {
    /// Reports an informational step
    fn report(&self, message: &str);

    /// Reports progress through the analyzed packages
    ///
    /// # Arguments
    /// * `current` - Packages processed so far
    /// * `total` - Packages to process
    /// * `message` - Optional detail, usually the package name
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a recoverable problem; the run continues
    fn report_warning(&self, message: &str);

    /// Reports an error
    fn report_error(&self, message: &str);

    /// Reports completion of the run
    fn report_completion(&self, message: &str);
}
