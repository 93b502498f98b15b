use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::adjustments::{summarize_growth, GrowthSummary};
use super::entry::GrowthPeriodEntry;
use super::MAX_HORIZON_YEARS;
use crate::error::FinCalcError;
use crate::time_value::{checked_compound, periodic_rate};
use crate::types::*;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often a step-up SIP raises its contribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepUpFrequency {
    #[default]
    Yearly,
    HalfYearly,
}

impl StepUpFrequency {
    pub fn months(self) -> u32 {
        match self {
            StepUpFrequency::Yearly => 12,
            StepUpFrequency::HalfYearly => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionPattern {
    /// A contribution every `12 / frequency_per_year` months.
    #[default]
    Periodic,
    /// A single contribution in the first month.
    LumpSum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPlan {
    pub contribution_amount: Money,
    pub annual_return_percent: Percent,
    pub horizon_years: u32,
    #[serde(default)]
    pub frequency_per_year: Frequency,
    #[serde(default)]
    pub step_up_percent: Percent,
    #[serde(default)]
    pub step_up_frequency: StepUpFrequency,
    #[serde(default)]
    pub inflation_percent: Percent,
    #[serde(default)]
    pub tax_percent: Percent,
    #[serde(default)]
    pub pattern: ContributionPattern,
    #[serde(default)]
    pub rate_convention: RateConvention,
    /// Corpus already invested at the start of the horizon.
    #[serde(default)]
    pub initial_corpus: Money,
}

impl InvestmentPlan {
    /// Plain monthly SIP with no step-up, inflation or tax.
    pub fn sip(monthly_amount: Money, annual_return_percent: Percent, years: u32) -> Self {
        Self {
            contribution_amount: monthly_amount,
            annual_return_percent,
            horizon_years: years,
            frequency_per_year: Frequency::Monthly,
            step_up_percent: Decimal::ZERO,
            step_up_frequency: StepUpFrequency::Yearly,
            inflation_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
            pattern: ContributionPattern::Periodic,
            rate_convention: RateConvention::Effective,
            initial_corpus: Decimal::ZERO,
        }
    }

    /// One-off investment held for `years`.
    pub fn lump_sum(amount: Money, annual_return_percent: Percent, years: u32) -> Self {
        Self {
            pattern: ContributionPattern::LumpSum,
            ..Self::sip(amount, annual_return_percent, years)
        }
    }

    pub fn validate(&self) -> FinCalcResult<()> {
        if self.contribution_amount <= Decimal::ZERO {
            return Err(FinCalcError::plan(
                "contribution_amount",
                "contribution must be positive",
            ));
        }
        self.validate_terms()
    }

    /// Everything except the contribution amount, which the retirement
    /// projector allows to be zero.
    pub(crate) fn validate_terms(&self) -> FinCalcResult<()> {
        if self.contribution_amount < Decimal::ZERO {
            return Err(FinCalcError::plan(
                "contribution_amount",
                "contribution cannot be negative",
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
        if self.step_up_percent < Decimal::ZERO {
            return Err(FinCalcError::plan("step_up_percent", "step-up cannot be negative"));
        }
        if self.inflation_percent < Decimal::ZERO {
            return Err(FinCalcError::plan("inflation_percent", "inflation cannot be negative"));
        }
        if self.tax_percent < Decimal::ZERO || self.tax_percent > dec!(100) {
            return Err(FinCalcError::plan("tax_percent", "tax must be between 0 and 100"));
        }
        if self.initial_corpus < Decimal::ZERO {
            return Err(FinCalcError::plan("initial_corpus", "initial corpus cannot be negative"));
        }
        Ok(())
    }

    /// Monthly rate the simulation credits.
    pub fn monthly_rate(&self) -> FinCalcResult<Rate> {
        periodic_rate(
            percent_to_rate(self.annual_return_percent),
            12,
            self.rate_convention,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionProjection {
    pub monthly_rate: Rate,
    pub entries: Vec<GrowthPeriodEntry>,
    pub summary: GrowthSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate a SIP, step-up SIP or lump-sum plan month by month and report
/// one entry per year.
pub fn simulate_contribution(
    plan: &InvestmentPlan,
) -> FinCalcResult<ComputationOutput<ContributionProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    plan.validate()?;
    if plan.pattern == ContributionPattern::LumpSum && !plan.step_up_percent.is_zero() {
        warnings.push("Step-up has no effect on a lump-sum plan".into());
    }

    let monthly_rate = plan.monthly_rate()?;
    let entries = accumulate(plan)?;
    let summary = summarize_growth(
        &entries,
        percent_to_rate(plan.inflation_percent),
        percent_to_rate(plan.tax_percent),
    )?;
    log::debug!(
        "contribution plan: {} years, maturity {}, invested {}",
        plan.horizon_years,
        summary.maturity_value,
        summary.total_contributed
    );

    let output = ContributionProjection {
        monthly_rate,
        entries,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly compounding simulation (contributions at start of month)",
        &serde_json::json!({
            "pattern": format!("{:?}", plan.pattern),
            "frequency_per_year": plan.frequency_per_year.periods_per_year(),
            "annual_return_percent": plan.annual_return_percent.to_string(),
            "rate_convention": format!("{:?}", plan.rate_convention),
            "step_up_percent": plan.step_up_percent.to_string(),
            "step_up_frequency": format!("{:?}", plan.step_up_frequency),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Month-by-month accumulation. Validates the plan terms but accepts a zero
/// contribution.
pub(crate) fn accumulate(plan: &InvestmentPlan) -> FinCalcResult<Vec<GrowthPeriodEntry>> {
    plan.validate_terms()?;

    let rate = plan.monthly_rate()?;
    let months = plan.horizon_years * 12;
    let step = match plan.pattern {
        ContributionPattern::Periodic => percent_to_rate(plan.step_up_percent),
        ContributionPattern::LumpSum => Decimal::ZERO,
    };
    let step_months = plan.step_up_frequency.months();
    let months_between = plan.frequency_per_year.months_per_period();

    // Bound the trajectory up front so the loop below cannot overflow
    let growth = checked_compound(rate.max(Decimal::ZERO), months)
        .ok_or_else(|| FinCalcError::plan("horizon_years", "growth factor overflows"))?;
    let step_growth = checked_compound(step, months / step_months)
        .ok_or_else(|| FinCalcError::plan("step_up_percent", "step-up factor overflows"))?;
    let contributions = Decimal::from(months)
        .checked_mul(plan.contribution_amount)
        .and_then(|v| v.checked_mul(step_growth))
        .and_then(|v| v.checked_add(plan.initial_corpus))
        .and_then(|v| v.checked_mul(growth));
    if contributions.is_none() {
        return Err(FinCalcError::plan(
            "contribution_amount",
            "projected value is not representable",
        ));
    }

    let mut entries = Vec::with_capacity(plan.horizon_years as usize);
    let mut value = plan.initial_corpus;
    let mut contribution = plan.contribution_amount;
    let mut cumulative = plan.initial_corpus;

    for year in 1..=plan.horizon_years {
        let opening = value;
        let mut year_contribution = Decimal::ZERO;
        let mut year_returns = Decimal::ZERO;

        for month_in_year in 1..=12u32 {
            let month = (year - 1) * 12 + month_in_year;
            let contributes = match plan.pattern {
                ContributionPattern::Periodic => (month_in_year - 1) % months_between == 0,
                ContributionPattern::LumpSum => month == 1,
            };
            if contributes {
                value += contribution;
                year_contribution += contribution;
            }

            let earned = value * rate;
            value += earned;
            year_returns += earned;

            if !step.is_zero() && month % step_months == 0 {
                contribution += contribution * step;
            }
        }

        cumulative += year_contribution;
        entries.push(GrowthPeriodEntry {
            period_index: year,
            opening_value: opening,
            contribution: year_contribution,
            returns_earned: year_returns,
            closing_value: value,
            cumulative_contribution: cumulative,
            depleted: false,
        });
    }

    Ok(entries)
}
