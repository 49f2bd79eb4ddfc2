/// Filesystem adapters for package discovery, manifests and output
pub(crate) mod distribution_layout;
mod file_writer;
mod manifest_reader;
mod package_locator;

pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use manifest_reader::FileSystemManifestReader;
pub use package_locator::FileSystemPackageLocator;
