use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::adjustments::real_value_of;
use super::entry::GrowthPeriodEntry;
use super::MAX_HORIZON_YEARS;
use crate::error::FinCalcError;
use crate::time_value::{checked_compound, periodic_rate};
use crate::types::*;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    pub initial_corpus: Money,
    /// Amount taken out each sub-period.
    pub withdrawal_amount: Money,
    #[serde(default)]
    pub frequency_per_year: Frequency,
    pub annual_return_percent: Percent,
    pub horizon_years: u32,
    /// Yearly increase of the withdrawal amount.
    #[serde(default)]
    pub withdrawal_step_up_percent: Percent,
    #[serde(default)]
    pub inflation_percent: Percent,
    #[serde(default)]
    pub rate_convention: RateConvention,
}

impl WithdrawalPlan {
    pub fn validate(&self) -> FinCalcResult<()> {
        if self.initial_corpus <= Decimal::ZERO {
            return Err(FinCalcError::plan("initial_corpus", "corpus must be positive"));
        }
        if self.withdrawal_amount < Decimal::ZERO {
            return Err(FinCalcError::plan(
                "withdrawal_amount",
                "withdrawal cannot be negative",
            ));
        }
        if self.horizon_years == 0 || self.horizon_years > MAX_HORIZON_YEARS {
            return Err(FinCalcError::plan(
                "horizon_years",
                format!("horizon must be between 1 and {MAX_HORIZON_YEARS} years"),
            ));
        }
        if self.annual_return_percent <= dec!(-100) {
            return Err(FinCalcError::plan(
                "annual_return_percent",
                "return must be greater than -100%",
            ));
        }
        if self.withdrawal_step_up_percent < Decimal::ZERO {
            return Err(FinCalcError::plan(
                "withdrawal_step_up_percent",
                "step-up cannot be negative",
            ));
        }
        if self.inflation_percent < Decimal::ZERO {
            return Err(FinCalcError::plan("inflation_percent", "inflation cannot be negative"));
        }
        Ok(())
    }
}

/// When and how the corpus ran out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depletion {
    /// Sub-period in which the balance reached zero, 1-based over the horizon.
    pub period: u32,
    /// Year in which that sub-period falls.
    pub year: u32,
    /// Fractional years from the start, counting the partial final
    /// withdrawal as a fraction of a sub-period.
    pub years_elapsed: Years,
    pub final_withdrawal: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalProjection {
    pub periodic_rate: Rate,
    pub entries: Vec<GrowthPeriodEntry>,
    pub depletion: Option<Depletion>,
    pub total_withdrawn: Money,
    pub total_returns: Money,
    pub final_value: Money,
    /// `final_value` in today's money.
    pub real_final_value: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Systematic withdrawal plan: each sub-period the return is credited on the
/// opening balance, then the withdrawal is taken. Stops at the horizon or at
/// the first sub-period the balance cannot cover.
pub fn simulate_withdrawal(
    plan: &WithdrawalPlan,
) -> FinCalcResult<ComputationOutput<WithdrawalProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = run_withdrawal(plan)?;

    if plan.withdrawal_amount.is_zero() {
        warnings.push("Withdrawal amount is zero; the corpus only compounds".into());
    }
    if let Some(d) = &output.depletion {
        log::debug!(
            "withdrawal plan depleted in period {} (year {}, {} years)",
            d.period,
            d.year,
            d.years_elapsed
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Systematic withdrawal (return credited, then withdrawal)",
        &serde_json::json!({
            "initial_corpus": plan.initial_corpus.to_string(),
            "withdrawal_amount": plan.withdrawal_amount.to_string(),
            "frequency_per_year": plan.frequency_per_year.periods_per_year(),
            "annual_return_percent": plan.annual_return_percent.to_string(),
            "rate_convention": format!("{:?}", plan.rate_convention),
            "withdrawal_step_up_percent": plan.withdrawal_step_up_percent.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

pub(crate) fn run_withdrawal(plan: &WithdrawalPlan) -> FinCalcResult<WithdrawalProjection> {
    plan.validate()?;

    let periods_per_year = plan.frequency_per_year.periods_per_year();
    let rate = periodic_rate(
        percent_to_rate(plan.annual_return_percent),
        periods_per_year,
        plan.rate_convention,
    )?;
    let step = percent_to_rate(plan.withdrawal_step_up_percent);

    let bound = checked_compound(rate.max(Decimal::ZERO), periods_per_year * plan.horizon_years)
        .and_then(|g| g.checked_mul(plan.initial_corpus));
    if bound.is_none() {
        return Err(FinCalcError::plan("initial_corpus", "projected value is not representable"));
    }

    let mut entries = Vec::with_capacity(plan.horizon_years as usize);
    let mut balance = plan.initial_corpus;
    let mut withdrawal = plan.withdrawal_amount;
    let mut total_withdrawn = Decimal::ZERO;
    let mut total_returns = Decimal::ZERO;
    let mut depletion: Option<Depletion> = None;

    'years: for year in 1..=plan.horizon_years {
        let opening = balance;
        let mut year_withdrawn = Decimal::ZERO;
        let mut year_returns = Decimal::ZERO;

        for sub in 1..=periods_per_year {
            let earned = balance * rate;
            balance += earned;
            year_returns += earned;

            if withdrawal.is_zero() {
                continue;
            }
            let taken = withdrawal.min(balance);
            balance -= taken;
            year_withdrawn += taken;

            if balance.is_zero() {
                let period = (year - 1) * periods_per_year + sub;
                let fraction = taken / withdrawal;
                depletion = Some(Depletion {
                    period,
                    year,
                    years_elapsed: (Decimal::from(period - 1) + fraction)
                        / Decimal::from(periods_per_year),
                    final_withdrawal: taken,
                });
                total_withdrawn += year_withdrawn;
                total_returns += year_returns;
                entries.push(withdrawal_entry(
                    year,
                    opening,
                    year_withdrawn,
                    year_returns,
                    balance,
                    total_withdrawn,
                    true,
                ));
                break 'years;
            }
        }

        total_withdrawn += year_withdrawn;
        total_returns += year_returns;
        entries.push(withdrawal_entry(
            year,
            opening,
            year_withdrawn,
            year_returns,
            balance,
            total_withdrawn,
            false,
        ));
        if !step.is_zero() {
            withdrawal = withdrawal
                .checked_mul(step)
                .and_then(|raise| withdrawal.checked_add(raise))
                .ok_or_else(|| {
                    FinCalcError::plan("withdrawal_step_up_percent", "withdrawal overflows")
                })?;
        }
    }

    let years = entries.len() as u32;
    Ok(WithdrawalProjection {
        periodic_rate: rate,
        depletion,
        total_withdrawn,
        total_returns,
        final_value: balance,
        real_final_value: real_value_of(
            balance,
            percent_to_rate(plan.inflation_percent),
            years,
        )?,
        entries,
    })
}

fn withdrawal_entry(
    year: u32,
    opening: Money,
    withdrawn: Money,
    returns: Money,
    closing: Money,
    total_withdrawn: Money,
    depleted: bool,
) -> GrowthPeriodEntry {
    GrowthPeriodEntry {
        period_index: year,
        opening_value: opening,
        contribution: -withdrawn,
        returns_earned: returns,
        closing_value: closing,
        cumulative_contribution: -total_withdrawn,
        depleted,
    }
}
