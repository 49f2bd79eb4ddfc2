/// Boundary analysis domain - entities and pure services
///
/// Nothing in this module touches the filesystem or the network directly;
/// collaborators are reached through the outbound ports.
pub mod domain;
pub mod services;
