use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::checked_compound;
use crate::types::{percent_to_rate, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::FinCalcResult;

/// Longest tenure the engine will schedule (100 years of monthly installments).
pub const MAX_TENURE_MONTHS: u32 = 1200;

/// Monthly rate for an annual percentage rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    percent_to_rate(annual_rate_percent) / Decimal::from(12)
}

/// Equated monthly installment, `P·r·(1+r)^n / ((1+r)^n − 1)`.
///
/// This is the bare amortized-loan formula and rejects a zero rate, where it
/// divides by zero. Use [`level_installment`] when zero-interest loans must
/// be scheduled.
pub fn compute_installment(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> FinCalcResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(FinCalcError::terms("principal", "principal must be positive"));
    }
    if annual_rate_percent <= Decimal::ZERO {
        return Err(FinCalcError::terms(
            "annual_rate_percent",
            "the amortized-loan formula needs a positive rate",
        ));
    }
    if tenure_months == 0 {
        return Err(FinCalcError::terms("tenure_months", "tenure must be at least 1 month"));
    }
    level_payment(principal, monthly_rate(annual_rate_percent), tenure_months)
}

/// Installment that retires `principal` in `tenure_months` equal payments.
/// Falls back to straight-line `principal / tenure_months` at a zero rate.
pub fn level_installment(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> FinCalcResult<Money> {
    if annual_rate_percent.is_zero() {
        if principal <= Decimal::ZERO {
            return Err(FinCalcError::terms("principal", "principal must be positive"));
        }
        if tenure_months == 0 {
            return Err(FinCalcError::terms("tenure_months", "tenure must be at least 1 month"));
        }
        return Ok(principal / Decimal::from(tenure_months));
    }
    compute_installment(principal, annual_rate_percent, tenure_months)
}

/// Installment and what it costs over the full tenure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentQuote {
    pub installment: Money,
    pub tenure_months: u32,
    pub total_payable: Money,
    pub total_interest: Money,
}

/// EMI calculator: the level installment plus total interest and total
/// payable, without building the schedule.
pub fn quote_installment(
    principal: Money,
    annual_rate_percent: Percent,
    tenure_months: u32,
) -> FinCalcResult<ComputationOutput<InstallmentQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if tenure_months > MAX_TENURE_MONTHS {
        return Err(FinCalcError::terms(
            "tenure_months",
            format!("tenure cannot exceed {MAX_TENURE_MONTHS} months"),
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(FinCalcError::terms("annual_rate_percent", "rate cannot be negative"));
    }
    if annual_rate_percent.is_zero() {
        warnings.push("Zero rate: installment is principal spread evenly over the tenure".into());
    }

    let installment = level_installment(principal, annual_rate_percent, tenure_months)?;
    let total_payable = installment
        .checked_mul(Decimal::from(tenure_months))
        .ok_or_else(|| FinCalcError::terms("principal", "total payable is not representable"))?;
    let output = InstallmentQuote {
        installment,
        tenure_months,
        total_payable,
        total_interest: total_payable - principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Equated monthly installment (reducing balance)",
        &serde_json::json!({
            "principal": principal.to_string(),
            "annual_rate_percent": annual_rate_percent.to_string(),
            "tenure_months": tenure_months,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Level payment for a balance at a periodic rate; straight-line at zero rate.
pub(crate) fn level_payment(balance: Money, rate: Rate, periods: u32) -> FinCalcResult<Money> {
    if periods == 0 {
        return Err(FinCalcError::terms("tenure_months", "no periods left to amortize over"));
    }
    if rate.is_zero() {
        return Ok(balance / Decimal::from(periods));
    }

    let growth = checked_compound(rate, periods).ok_or_else(|| {
        FinCalcError::terms("tenure_months", "rate and tenure overflow the growth factor")
    })?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(FinCalcError::terms("annual_rate_percent", "rate too small to amortize"));
    }

    balance
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| FinCalcError::terms("principal", "installment is not representable"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_emi() {
        // 10 lakh at 8.5% over 20 years ≈ 8,678
        let emi = compute_installment(dec!(1_000_000), dec!(8.5), 240).unwrap();
        assert!((emi - dec!(8678)).abs() < dec!(1), "emi = {emi}");
    }

    #[test]
    fn test_single_period_repays_with_interest() {
        let emi = compute_installment(dec!(1200), dec!(12), 1).unwrap();
        assert_eq!(emi.round_dp(8), dec!(1212));
    }

    #[test]
    fn test_zero_rate_rejected_by_formula() {
        let err = compute_installment(dec!(1000), Decimal::ZERO, 10).unwrap_err();
        assert!(matches!(err, FinCalcError::InvalidTerms { .. }));
    }

    #[test]
    fn test_zero_rate_level_is_linear() {
        let emi = level_installment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(emi, dec!(100));
    }

    #[test]
    fn test_quote_totals() {
        let out = quote_installment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(out.result.installment, dec!(100));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);

        let out = quote_installment(dec!(1_000_000), dec!(8.5), 240).unwrap();
        assert!((out.result.total_interest - dec!(1_082_800)).abs() < dec!(500));
        assert!(quote_installment(dec!(1000), dec!(8), MAX_TENURE_MONTHS + 1).is_err());
    }

    #[test]
    fn test_non_positive_inputs_rejected() {
        assert!(compute_installment(Decimal::ZERO, dec!(8), 12).is_err());
        assert!(compute_installment(dec!(-5), dec!(8), 12).is_err());
        assert!(compute_installment(dec!(1000), dec!(-1), 12).is_err());
        assert!(compute_installment(dec!(1000), dec!(8), 0).is_err());
        assert!(level_installment(dec!(1000), Decimal::ZERO, 0).is_err());
    }

    fn terms_error_field(result: FinCalcResult<Money>) -> String {
        match result.unwrap_err() {
            FinCalcError::InvalidTerms { field, .. } => field,
            other => panic!("expected InvalidTerms, got {other:?}"),
        }
    }

    #[test]
    fn test_unrepresentable_installments_are_term_errors() {
        // 1.8333^1200 does not fit in a Decimal
        assert_eq!(
            terms_error_field(compute_installment(dec!(1_000), dec!(1000), 1200)),
            "tenure_months"
        );
        assert_eq!(
            terms_error_field(compute_installment(Decimal::MAX / dec!(10), dec!(12), 1200)),
            "principal"
        );

        // the installment fits, twelve hundred of them do not
        let principal = Decimal::MAX / dec!(1.0001);
        let err = quote_installment(principal, dec!(0.001), MAX_TENURE_MONTHS).unwrap_err();
        assert!(matches!(
            err,
            FinCalcError::InvalidTerms { ref field, .. } if field == "principal"
        ));
    }
}
