/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, interpreter, network, console).
pub mod import_extractor;
pub mod manifest_reader;
pub mod output_presenter;
pub mod package_index;
pub mod package_locator;
pub mod progress_reporter;
pub mod report_formatter;

pub use import_extractor::{ExtractedImports, ImportExtractor};
pub use manifest_reader::ManifestReader;
pub use output_presenter::OutputPresenter;
pub use package_index::{IndexError, PackageIndex};
pub use package_locator::PackageLocator;
pub use progress_reporter::ProgressReporter;
pub use report_formatter::ReportFormatter;
