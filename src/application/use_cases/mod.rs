/// Use cases module containing application business logic orchestration
mod check_boundaries;

pub use check_boundaries::CheckBoundariesUseCase;
