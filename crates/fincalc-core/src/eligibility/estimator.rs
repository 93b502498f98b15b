use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{monthly_rate, MAX_TENURE_MONTHS};
use crate::error::FinCalcError;
use crate::time_value::pv_annuity_factor;
use crate::types::*;
use crate::FinCalcResult;

/// Lowest FOIR a profile is evaluated at.
pub const MIN_FOIR: Percent = dec!(15);
/// Highest FOIR a profile is evaluated at.
pub const MAX_FOIR: Percent = dec!(80);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityProfile {
    pub monthly_income: Money,
    /// Installments already being paid each month.
    #[serde(default)]
    pub existing_obligations: Money,
    pub foir_percent: Percent,
    pub annual_rate_percent: Percent,
    pub tenure_years: u32,
}

/// Which limit decided the eligible installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingConstraint {
    Foir,
    ResidualIncome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityEstimate {
    /// FOIR after clamping.
    pub applied_foir_percent: Percent,
    pub emi_capacity: Money,
    pub residual_capacity: Money,
    pub eligible_installment: Money,
    /// Rounded toward zero to the cent.
    pub eligible_principal: Money,
    pub tenure_months: u32,
    pub total_payable: Money,
    pub total_interest: Money,
    pub binding_constraint: BindingConstraint,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate the largest loan a borrower can service.
///
/// The installment is capped by both `income × FOIR` and the income left
/// after existing obligations; the principal is the amortized-loan formula
/// solved for `P`. Rounding toward zero keeps the principal's own installment
/// within the cap.
pub fn estimate_eligibility(
    profile: &EligibilityProfile,
) -> FinCalcResult<ComputationOutput<EligibilityEstimate>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(profile)?;

    let applied_foir = profile.foir_percent.clamp(MIN_FOIR, MAX_FOIR);
    if applied_foir != profile.foir_percent {
        warnings.push(format!(
            "FOIR {}% clamped to {}% (allowed range {}-{}%)",
            profile.foir_percent, applied_foir, MIN_FOIR, MAX_FOIR
        ));
    }

    let emi_capacity = profile.monthly_income * percent_to_rate(applied_foir);
    let residual_capacity =
        (profile.monthly_income - profile.existing_obligations).max(Decimal::ZERO);
    let (eligible_installment, binding_constraint) = if emi_capacity <= residual_capacity {
        (emi_capacity, BindingConstraint::Foir)
    } else {
        (residual_capacity, BindingConstraint::ResidualIncome)
    };
    if eligible_installment.is_zero() {
        warnings
            .push("Existing obligations absorb the whole income; no loan is serviceable".into());
    }

    let tenure_months = profile.tenure_years * 12;
    let rate = monthly_rate(profile.annual_rate_percent);
    let factor = pv_annuity_factor(rate, tenure_months).ok_or_else(|| {
        FinCalcError::input("tenure_years", "rate and tenure overflow the annuity factor")
    })?;
    let eligible_principal = eligible_installment
        .checked_mul(factor)
        .ok_or_else(|| FinCalcError::input("monthly_income", "eligible principal overflows"))?
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);

    let total_payable = eligible_installment
        .checked_mul(Decimal::from(tenure_months))
        .ok_or_else(|| FinCalcError::input("monthly_income", "total payable overflows"))?;
    let total_interest = (total_payable - eligible_principal).max(Decimal::ZERO);

    log::debug!(
        "eligibility: installment {} over {} months supports principal {}",
        eligible_installment,
        tenure_months,
        eligible_principal
    );

    let output = EligibilityEstimate {
        applied_foir_percent: applied_foir,
        emi_capacity,
        residual_capacity,
        eligible_installment,
        eligible_principal,
        tenure_months,
        total_payable,
        total_interest,
        binding_constraint,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FOIR-constrained inversion of the amortized-loan formula",
        &serde_json::json!({
            "foir_percent": applied_foir.to_string(),
            "annual_rate_percent": profile.annual_rate_percent.to_string(),
            "tenure_years": profile.tenure_years,
            "rounding": "principal truncated to 2 dp",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn validate(profile: &EligibilityProfile) -> FinCalcResult<()> {
    if profile.monthly_income <= Decimal::ZERO {
        return Err(FinCalcError::input("monthly_income", "income must be positive"));
    }
    if profile.existing_obligations < Decimal::ZERO {
        return Err(FinCalcError::input(
            "existing_obligations",
            "obligations cannot be negative",
        ));
    }
    if profile.annual_rate_percent < Decimal::ZERO {
        return Err(FinCalcError::input("annual_rate_percent", "rate cannot be negative"));
    }
    if profile.tenure_years == 0 || profile.tenure_years * 12 > MAX_TENURE_MONTHS {
        return Err(FinCalcError::input(
            "tenure_years",
            format!("tenure must be between 1 and {} years", MAX_TENURE_MONTHS / 12),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::level_installment;

    fn profile(income: Money, obligations: Money, foir: Percent) -> EligibilityProfile {
        EligibilityProfile {
            monthly_income: income,
            existing_obligations: obligations,
            foir_percent: foir,
            annual_rate_percent: dec!(9),
            tenure_years: 20,
        }
    }

    #[test]
    fn test_foir_binds() {
        let out = estimate_eligibility(&profile(dec!(100_000), dec!(10_000), dec!(50))).unwrap();
        let e = &out.result;
        assert_eq!(e.emi_capacity, dec!(50_000));
        assert_eq!(e.residual_capacity, dec!(90_000));
        assert_eq!(e.eligible_installment, dec!(50_000));
        assert_eq!(e.binding_constraint, BindingConstraint::Foir);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_obligations_bind() {
        let out = estimate_eligibility(&profile(dec!(100_000), dec!(70_000), dec!(50))).unwrap();
        assert_eq!(out.result.eligible_installment, dec!(30_000));
        assert_eq!(out.result.binding_constraint, BindingConstraint::ResidualIncome);
    }

    #[test]
    fn test_foir_clamped_both_ways() {
        let high = estimate_eligibility(&profile(dec!(100_000), Decimal::ZERO, dec!(95))).unwrap();
        assert_eq!(high.result.applied_foir_percent, dec!(80));
        assert_eq!(high.warnings.len(), 1);

        let low = estimate_eligibility(&profile(dec!(100_000), Decimal::ZERO, dec!(5))).unwrap();
        assert_eq!(low.result.applied_foir_percent, dec!(15));
        assert_eq!(low.result.eligible_installment, dec!(15_000));
    }

    #[test]
    fn test_principal_round_trips_below_installment() {
        let out = estimate_eligibility(&profile(dec!(85_000), dec!(12_500), dec!(45))).unwrap();
        let e = &out.result;
        assert!(e.eligible_principal.scale() <= 2);
        let back = level_installment(e.eligible_principal, dec!(9), e.tenure_months).unwrap();
        assert!(back <= e.eligible_installment);
        assert!(e.eligible_installment - back < dec!(0.01));
    }

    #[test]
    fn test_zero_rate_principal_is_installment_times_months() {
        let mut p = profile(dec!(60_000), Decimal::ZERO, dec!(50));
        p.annual_rate_percent = Decimal::ZERO;
        p.tenure_years = 5;
        let out = estimate_eligibility(&p).unwrap();
        assert_eq!(out.result.eligible_principal, dec!(1_800_000));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_obligations_exceeding_income() {
        let out = estimate_eligibility(&profile(dec!(50_000), dec!(60_000), dec!(50))).unwrap();
        assert_eq!(out.result.eligible_installment, Decimal::ZERO);
        assert_eq!(out.result.eligible_principal, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_profiles() {
        let mut bad = profile(Decimal::ZERO, Decimal::ZERO, dec!(50));
        assert!(matches!(
            estimate_eligibility(&bad).unwrap_err(),
            FinCalcError::InvalidInput { .. }
        ));
        bad = profile(dec!(10_000), Decimal::ZERO, dec!(50));
        bad.tenure_years = 0;
        assert!(estimate_eligibility(&bad).is_err());
        bad.tenure_years = 10;
        bad.annual_rate_percent = dec!(-1);
        assert!(estimate_eligibility(&bad).is_err());
    }

    #[test]
    fn test_unrepresentable_principal_rejected() {
        let mut p = profile(Decimal::MAX / dec!(10), Decimal::ZERO, dec!(50));
        p.annual_rate_percent = Decimal::ZERO;
        p.tenure_years = 30;
        assert!(matches!(
            estimate_eligibility(&p).unwrap_err(),
            FinCalcError::InvalidInput { .. }
        ));
    }
}
