/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the outbound ports,
/// providing the actual integration with the filesystem, the Python
/// interpreter, the package index and the console.
pub mod outbound;
