use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.085 = 8.5%).
pub type Rate = Decimal;

/// Rates as the calculators collect them (8.5 = 8.5%).
pub type Percent = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Convert a percentage input into a decimal rate.
pub fn percent_to_rate(percent: Percent) -> Rate {
    percent / dec!(100)
}

/// Contribution or withdrawal frequency. Serialized as the number of
/// periods per year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Frequency {
    Annual,
    HalfYearly,
    Quarterly,
    #[default]
    Monthly,
}

impl Frequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::HalfYearly => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }

    /// Months between two consecutive periods.
    pub fn months_per_period(self) -> u32 {
        12 / self.periods_per_year()
    }
}

impl TryFrom<u32> for Frequency {
    type Error = FinCalcError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Frequency::Annual),
            2 => Ok(Frequency::HalfYearly),
            4 => Ok(Frequency::Quarterly),
            12 => Ok(Frequency::Monthly),
            other => Err(FinCalcError::plan(
                "frequency_per_year",
                format!("{other} is not one of 1, 2, 4, 12"),
            )),
        }
    }
}

impl From<Frequency> for u32 {
    fn from(f: Frequency) -> Self {
        f.periods_per_year()
    }
}

/// How an annual rate is turned into a per-period rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateConvention {
    /// Geometric conversion, `(1 + R)^(1/p) - 1`. Compounds back to exactly `R`.
    #[default]
    Effective,
    /// Simple division, `R / p`, as most published SIP calculators quote.
    Nominal,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    for w in &warnings {
        log::warn!("{methodology}: {w}");
    }
    log::debug!("{methodology} finished in {elapsed_us}us");

    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_round_trips_through_integer() {
        for f in [1u32, 2, 4, 12] {
            let freq = Frequency::try_from(f).unwrap();
            assert_eq!(u32::from(freq), f);
        }
    }

    #[test]
    fn test_unsupported_frequency_rejected() {
        let err = Frequency::try_from(3).unwrap_err();
        assert!(matches!(err, FinCalcError::InvalidPlan { .. }));
        assert!(serde_json::from_str::<Frequency>("6").is_err());
    }

    #[test]
    fn test_months_per_period() {
        assert_eq!(Frequency::Quarterly.months_per_period(), 3);
        assert_eq!(Frequency::Annual.months_per_period(), 12);
    }

    #[test]
    fn test_percent_to_rate() {
        assert_eq!(percent_to_rate(dec!(8.5)), dec!(0.085));
    }
}
