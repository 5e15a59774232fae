pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "real_estate")]
pub mod real_estate;

pub use error::DealEvalError;
pub use types::*;

/// Standard result type for all deal-eval operations
pub type DealEvalResult<T> = Result<T, DealEvalError>;
