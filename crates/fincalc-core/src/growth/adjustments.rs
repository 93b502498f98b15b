use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::GrowthPeriodEntry;
use crate::error::FinCalcError;
use crate::time_value::checked_compound;
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Headline figures of an accumulation trajectory, nominal and adjusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSummary {
    pub total_contributed: Money,
    pub maturity_value: Money,
    pub wealth_gained: Money,
    /// Maturity value in today's money.
    pub real_value: Money,
    /// Flat tax on positive gains; losses are not credited.
    pub tax_on_gains: Money,
    pub post_tax_value: Money,
    pub real_post_tax_value: Money,
}

/// Deflate `nominal` by `years` of inflation. `None` when the deflator is
/// not representable.
pub fn inflation_adjusted(nominal: Money, inflation_rate: Rate, years: u32) -> Option<Money> {
    let deflator = checked_compound(inflation_rate, years)?;
    if deflator.is_zero() {
        return Some(nominal);
    }
    nominal.checked_div(deflator)
}

/// [`inflation_adjusted`] reported as a plan error on overflow.
pub(crate) fn real_value_of(
    nominal: Money,
    inflation_rate: Rate,
    years: u32,
) -> FinCalcResult<Money> {
    inflation_adjusted(nominal, inflation_rate, years)
        .ok_or_else(|| FinCalcError::plan("inflation_percent", "inflation factor overflows"))
}

/// Summarise a yearly trajectory. The entries are the simulation output; the
/// real and post-tax figures are views over the last entry.
pub fn summarize_growth(
    entries: &[GrowthPeriodEntry],
    inflation_rate: Rate,
    tax_rate: Rate,
) -> FinCalcResult<GrowthSummary> {
    let years = entries.len() as u32;
    let (maturity_value, total_contributed) = entries
        .last()
        .map(|e| (e.closing_value, e.cumulative_contribution))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));

    let wealth_gained = maturity_value - total_contributed;
    let tax_on_gains = wealth_gained.max(Decimal::ZERO) * tax_rate;
    let post_tax_value = maturity_value - tax_on_gains;

    Ok(GrowthSummary {
        total_contributed,
        maturity_value,
        wealth_gained,
        real_value: real_value_of(maturity_value, inflation_rate, years)?,
        tax_on_gains,
        post_tax_value,
        real_post_tax_value: real_value_of(post_tax_value, inflation_rate, years)?,
    })
}
