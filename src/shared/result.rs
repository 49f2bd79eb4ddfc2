/// Type alias for Result with anyhow::Error as the error type.
/// Every layer propagates errors through this alias; typed failures are
/// `FenceError` values wrapped inside the anyhow error.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
