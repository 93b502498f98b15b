use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinCalcError {
    #[error("Invalid loan terms: {field}: {reason}")]
    InvalidTerms { field: String, reason: String },

    #[error("Invalid plan: {field}: {reason}")]
    InvalidPlan { field: String, reason: String },

    #[error("Invalid age ordering: {0}")]
    InvalidAgeOrdering(String),

    #[error("Part-payment at period {period} is beyond the tenure of {tenure_months} months")]
    PartPaymentOutOfRange { period: u32, tenure_months: u32 },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FinCalcError {
    pub(crate) fn terms(field: &str, reason: impl Into<String>) -> Self {
        FinCalcError::InvalidTerms {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn plan(field: &str, reason: impl Into<String>) -> Self {
        FinCalcError::InvalidPlan {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn input(field: &str, reason: impl Into<String>) -> Self {
        FinCalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinCalcError {
    fn from(e: serde_json::Error) -> Self {
        FinCalcError::SerializationError(e.to_string())
    }
}
