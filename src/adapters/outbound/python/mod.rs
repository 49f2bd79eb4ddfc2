/// Python interpreter and source adapters
mod environment;
mod import_extractor;

pub use environment::PythonEnvironment;
pub use import_extractor::PythonImportExtractor;
