use rust_decimal::Decimal;

use crate::error::FinCalcError;
use crate::time_value::pv_annuity_factor;
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Return earned over inflation: `(r − i) / (1 + i)`.
pub fn real_rate(nominal_rate: Rate, inflation_rate: Rate) -> Rate {
    (nominal_rate - inflation_rate) / (Decimal::ONE + inflation_rate)
}

/// Corpus that funds `monthly_expense × 12` a year for `years` years when it
/// earns `post_retirement_rate` and the expense grows with inflation.
///
/// Discounts at the real rate; at a zero real rate the corpus is simply the
/// sum of the yearly expenses.
pub fn required_corpus(
    monthly_expense: Money,
    post_retirement_rate: Rate,
    inflation_rate: Rate,
    years: u32,
) -> FinCalcResult<Money> {
    let annual_need = monthly_expense
        .checked_mul(Decimal::from(12))
        .ok_or_else(|| FinCalcError::plan("current_monthly_expense", "yearly expense overflows"))?;
    let real = real_rate(post_retirement_rate, inflation_rate);
    let factor = pv_annuity_factor(real, years).ok_or_else(|| {
        FinCalcError::plan("post_retirement_return_percent", "annuity factor overflows")
    })?;
    annual_need
        .checked_mul(factor)
        .ok_or_else(|| FinCalcError::plan("current_monthly_expense", "required corpus overflows"))
}
