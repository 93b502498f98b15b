use rust_decimal::Decimal;

use crate::error::FinCalcError;
use crate::time_value::{checked_compound, fv_annuity_due_factor};
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Closed-form SIP maturity: `amount` invested at the start of each of
/// `periods` periods, compounding at `periodic_rate`.
pub fn sip_future_value(amount: Money, periodic_rate: Rate, periods: u32) -> FinCalcResult<Money> {
    let factor = fv_annuity_due_factor(periodic_rate, periods)
        .ok_or_else(|| FinCalcError::plan("horizon_years", "growth factor overflows"))?;
    amount
        .checked_mul(factor)
        .ok_or_else(|| FinCalcError::plan("contribution_amount", "maturity value overflows"))
}

/// Closed-form lump-sum maturity after `years` at `annual_rate`.
pub fn lump_sum_future_value(amount: Money, annual_rate: Rate, years: u32) -> FinCalcResult<Money> {
    let growth = checked_compound(annual_rate, years)
        .ok_or_else(|| FinCalcError::plan("horizon_years", "growth factor overflows"))?;
    amount
        .checked_mul(growth)
        .ok_or_else(|| FinCalcError::plan("contribution_amount", "maturity value overflows"))
}

/// Level contribution, paid at the start of each period, that grows to
/// `target` in `periods` periods. Inverse of [`sip_future_value`].
pub fn required_periodic_contribution(
    target: Money,
    periodic_rate: Rate,
    periods: u32,
) -> FinCalcResult<Money> {
    if periods == 0 {
        return Err(FinCalcError::plan("horizon_years", "no periods to contribute over"));
    }
    if target <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let factor = fv_annuity_due_factor(periodic_rate, periods)
        .ok_or_else(|| FinCalcError::plan("horizon_years", "growth factor overflows"))?;
    if factor <= Decimal::ZERO {
        return Err(FinCalcError::plan("annual_return_percent", "annuity factor is not positive"));
    }
    Ok(target / factor)
}
