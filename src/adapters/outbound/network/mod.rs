/// Network adapters for the remote package index
mod artifact;
mod circuit_breaking_index;
mod pypi_index;

pub use circuit_breaking_index::CircuitBreakingPackageIndex;
pub use pypi_index::PyPiPackageIndex;
