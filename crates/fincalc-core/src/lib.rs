pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "growth")]
pub mod growth;

#[cfg(feature = "retirement")]
pub mod retirement;

#[cfg(feature = "eligibility")]
pub mod eligibility;

#[cfg(feature = "pro_rata")]
pub mod pro_rata;

pub use error::FinCalcError;
pub use types::*;

/// Standard result type for all fincalc operations
pub type FinCalcResult<T> = Result<T, FinCalcError>;
