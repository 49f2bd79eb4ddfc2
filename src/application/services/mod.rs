/// Application services shared by use cases
mod requirement_resolver;

pub use requirement_resolver::{RequirementResolver, Resolution, DEFAULT_MAX_CONCURRENT_REQUESTS};
