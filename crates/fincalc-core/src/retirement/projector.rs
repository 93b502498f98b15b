use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::corpus::{real_rate, required_corpus};
use crate::error::FinCalcError;
use crate::growth::adjustments::real_value_of;
use crate::growth::contribution::accumulate;
use crate::growth::withdrawal::run_withdrawal;
use crate::growth::{
    required_periodic_contribution, ContributionPattern, GrowthPeriodEntry, InvestmentPlan,
    StepUpFrequency, WithdrawalPlan,
};
use crate::time_value::checked_compound;
use crate::types::*;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: Money,
    pub monthly_contribution: Money,
    /// Yearly increase of the monthly contribution.
    #[serde(default)]
    pub contribution_step_up_percent: Percent,
    pub pre_retirement_return_percent: Percent,
    pub post_retirement_return_percent: Percent,
    pub inflation_percent: Percent,
    /// Today's monthly living expense.
    pub current_monthly_expense: Money,
    /// Share of the expense that falls away at retirement.
    #[serde(default)]
    pub expense_reduction_percent: Percent,
    /// Raise the retirement withdrawal by inflation every year.
    #[serde(default)]
    pub inflation_indexed_withdrawals: bool,
    #[serde(default)]
    pub rate_convention: RateConvention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetirementPhase {
    Accumulation,
    Decumulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementYear {
    /// Age at the end of the year.
    pub age: u32,
    pub phase: RetirementPhase,
    pub opening_balance: Money,
    /// Contributions (positive) or withdrawals (negative).
    pub net_flow: Money,
    pub returns_earned: Money,
    pub closing_balance: Money,
    pub real_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationSummary {
    pub years_to_retirement: u32,
    pub total_contributions: Money,
    pub projected_corpus: Money,
    pub real_projected_corpus: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecumulationSummary {
    pub years_in_retirement: u32,
    pub monthly_expense_at_retirement: Money,
    pub total_withdrawn: Money,
    pub corpus_at_life_expectancy: Money,
    /// Fractional age at which the corpus runs out, if it does.
    pub depletion_age: Option<Years>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementProjection {
    pub accumulation: AccumulationSummary,
    pub decumulation: DecumulationSummary,
    pub required_corpus: Money,
    pub corpus_gap: Money,
    pub corpus_surplus: Money,
    pub is_sufficient: bool,
    /// Extra monthly SIP over the accumulation years that closes the gap.
    pub required_monthly_sip: Money,
    pub real_post_retirement_rate: Rate,
    pub year_by_year: Vec<RetirementYear>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project a retirement plan: grow today's savings and monthly contributions
/// until retirement, then draw the inflated expense down until life
/// expectancy, and size the corpus that would be needed.
pub fn project_retirement(
    input: &RetirementInput,
) -> FinCalcResult<ComputationOutput<RetirementProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let years_to_retirement = input.retirement_age - input.current_age;
    let years_in_retirement = input.life_expectancy - input.retirement_age;
    let inflation = percent_to_rate(input.inflation_percent);

    // --- Accumulation ---
    let plan = InvestmentPlan {
        contribution_amount: input.monthly_contribution,
        annual_return_percent: input.pre_retirement_return_percent,
        horizon_years: years_to_retirement,
        frequency_per_year: Frequency::Monthly,
        step_up_percent: input.contribution_step_up_percent,
        step_up_frequency: StepUpFrequency::Yearly,
        inflation_percent: input.inflation_percent,
        tax_percent: Decimal::ZERO,
        pattern: ContributionPattern::Periodic,
        rate_convention: input.rate_convention,
        initial_corpus: input.current_savings,
    };
    let accumulation_entries = accumulate(&plan)?;
    let (projected_corpus, total_invested) = accumulation_entries
        .last()
        .map(|e| (e.closing_value, e.cumulative_contribution))
        .unwrap_or((input.current_savings, input.current_savings));

    // --- Expense at retirement ---
    let retained_share = Decimal::ONE - percent_to_rate(input.expense_reduction_percent);
    let monthly_expense_at_retirement = checked_compound(inflation, years_to_retirement)
        .and_then(|growth| input.current_monthly_expense.checked_mul(growth))
        .map(|expense| expense * retained_share)
        .ok_or_else(|| {
            FinCalcError::plan("inflation_percent", "expense at retirement overflows")
        })?;

    // --- Decumulation ---
    let (decumulation_entries, total_withdrawn, corpus_at_life_expectancy, depletion_age) =
        if projected_corpus > Decimal::ZERO {
            let withdrawals = run_withdrawal(&WithdrawalPlan {
                initial_corpus: projected_corpus,
                withdrawal_amount: monthly_expense_at_retirement,
                frequency_per_year: Frequency::Monthly,
                annual_return_percent: input.post_retirement_return_percent,
                horizon_years: years_in_retirement,
                withdrawal_step_up_percent: if input.inflation_indexed_withdrawals {
                    input.inflation_percent
                } else {
                    Decimal::ZERO
                },
                inflation_percent: input.inflation_percent,
                rate_convention: input.rate_convention,
            })?;
            let depletion_age = withdrawals
                .depletion
                .map(|d| Decimal::from(input.retirement_age) + d.years_elapsed);
            (
                withdrawals.entries,
                withdrawals.total_withdrawn,
                withdrawals.final_value,
                depletion_age,
            )
        } else {
            warnings.push("No corpus at retirement; nothing to draw down".into());
            (
                Vec::new(),
                Decimal::ZERO,
                Decimal::ZERO,
                Some(Decimal::from(input.retirement_age)),
            )
        };

    if let Some(age) = depletion_age {
        if age < Decimal::from(input.life_expectancy) {
            warnings.push(format!(
                "Corpus runs out at age {} before life expectancy of {}",
                age.round_dp(1),
                input.life_expectancy
            ));
        }
    }

    // --- Required corpus and gap ---
    let post_rate = percent_to_rate(input.post_retirement_return_percent);
    let required = required_corpus(
        monthly_expense_at_retirement,
        post_rate,
        inflation,
        years_in_retirement,
    )?;
    let corpus_gap = (required - projected_corpus).max(Decimal::ZERO);
    let corpus_surplus = (projected_corpus - required).max(Decimal::ZERO);
    let required_monthly_sip = required_periodic_contribution(
        corpus_gap,
        plan.monthly_rate()?,
        years_to_retirement * 12,
    )?;

    log::debug!(
        "retirement: projected {}, required {}, gap {}",
        projected_corpus,
        required,
        corpus_gap
    );

    let year_by_year = build_year_by_year(
        input,
        inflation,
        &accumulation_entries,
        &decumulation_entries,
    )?;

    let output = RetirementProjection {
        accumulation: AccumulationSummary {
            years_to_retirement,
            total_contributions: total_invested - input.current_savings,
            projected_corpus,
            real_projected_corpus: real_value_of(
                projected_corpus,
                inflation,
                years_to_retirement,
            )?,
        },
        decumulation: DecumulationSummary {
            years_in_retirement,
            monthly_expense_at_retirement,
            total_withdrawn,
            corpus_at_life_expectancy,
            depletion_age,
        },
        required_corpus: required,
        corpus_gap,
        corpus_surplus,
        is_sufficient: corpus_gap.is_zero(),
        required_monthly_sip,
        real_post_retirement_rate: real_rate(post_rate, inflation),
        year_by_year,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Retirement projection (monthly accumulation, monthly drawdown, real-rate annuity corpus)",
        &serde_json::json!({
            "current_age": input.current_age,
            "retirement_age": input.retirement_age,
            "life_expectancy": input.life_expectancy,
            "pre_retirement_return_percent": input.pre_retirement_return_percent.to_string(),
            "post_retirement_return_percent": input.post_retirement_return_percent.to_string(),
            "inflation_percent": input.inflation_percent.to_string(),
            "inflation_indexed_withdrawals": input.inflation_indexed_withdrawals,
            "rate_convention": format!("{:?}", input.rate_convention),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn validate(input: &RetirementInput) -> FinCalcResult<()> {
    if input.current_age >= input.retirement_age {
        return Err(FinCalcError::InvalidAgeOrdering(format!(
            "current age {} must be below retirement age {}",
            input.current_age, input.retirement_age
        )));
    }
    if input.retirement_age >= input.life_expectancy {
        return Err(FinCalcError::InvalidAgeOrdering(format!(
            "retirement age {} must be below life expectancy {}",
            input.retirement_age, input.life_expectancy
        )));
    }
    if input.current_savings < Decimal::ZERO {
        return Err(FinCalcError::plan("current_savings", "savings cannot be negative"));
    }
    if input.monthly_contribution < Decimal::ZERO {
        return Err(FinCalcError::plan(
            "monthly_contribution",
            "contribution cannot be negative",
        ));
    }
    if input.current_monthly_expense <= Decimal::ZERO {
        return Err(FinCalcError::plan(
            "current_monthly_expense",
            "monthly expense must be positive",
        ));
    }
    if input.expense_reduction_percent < Decimal::ZERO
        || input.expense_reduction_percent >= dec!(100)
    {
        return Err(FinCalcError::plan(
            "expense_reduction_percent",
            "reduction must be at least 0 and below 100",
        ));
    }
    if input.inflation_percent < Decimal::ZERO {
        return Err(FinCalcError::plan("inflation_percent", "inflation cannot be negative"));
    }
    if input.post_retirement_return_percent <= dec!(-100) {
        return Err(FinCalcError::plan(
            "post_retirement_return_percent",
            "return must be greater than -100%",
        ));
    }
    Ok(())
}

fn build_year_by_year(
    input: &RetirementInput,
    inflation: Rate,
    accumulation: &[GrowthPeriodEntry],
    decumulation: &[GrowthPeriodEntry],
) -> FinCalcResult<Vec<RetirementYear>> {
    let to_year = |phase: RetirementPhase,
                   base_age: u32,
                   e: &GrowthPeriodEntry|
     -> FinCalcResult<RetirementYear> {
        let age = base_age + e.period_index;
        Ok(RetirementYear {
            age,
            phase,
            opening_balance: e.opening_value,
            net_flow: e.contribution,
            returns_earned: e.returns_earned,
            closing_balance: e.closing_value,
            real_value: real_value_of(e.closing_value, inflation, age - input.current_age)?,
        })
    };

    accumulation
        .iter()
        .map(|e| to_year(RetirementPhase::Accumulation, input.current_age, e))
        .chain(
            decumulation
                .iter()
                .map(|e| to_year(RetirementPhase::Decumulation, input.retirement_age, e)),
        )
        .collect()
}
