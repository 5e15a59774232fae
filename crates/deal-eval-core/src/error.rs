use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealEvalError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Malformed series: {0}")]
    SeriesParse(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DealEvalError {
    fn from(e: serde_json::Error) -> Self {
        DealEvalError::SerializationError(e.to_string())
    }
}

impl DealEvalError {
    /// Arithmetic left the `Decimal` range (about 7.9e28).
    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        DealEvalError::FinancialImpossibility(format!(
            "{} exceeds the representable decimal range",
            context.into()
        ))
    }
}
