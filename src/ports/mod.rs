/// Ports module defining interfaces for hexagonal architecture
///
/// Outbound (driven) ports are the interfaces the application core uses to
/// reach the filesystem, the interpreter, the package index and the console.
pub mod outbound;
