use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{run_schedule, AmortizationInput, ScheduleSummary};
use crate::types::*;
use crate::FinCalcResult;

/// Effect of a set of part-payments against the plain schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartPaymentImpact {
    pub baseline: ScheduleSummary,
    pub revised: ScheduleSummary,
    pub interest_saved: Money,
    /// Tenure reduction in months.
    pub months_saved: u32,
    /// Drop in the installment; only non-zero under `ReduceInstallment`.
    pub installment_reduction: Money,
}

/// Build the schedule with and without the part-payments and compare them.
pub fn compare_part_payments(
    input: &AmortizationInput,
) -> FinCalcResult<ComputationOutput<PartPaymentImpact>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let baseline_input = AmortizationInput {
        terms: input.terms.clone(),
        part_payments: Vec::new(),
        strategy: input.strategy,
    };
    let baseline = run_schedule(&baseline_input, &mut warnings)?.summary();
    let revised = run_schedule(input, &mut warnings)?.summary();

    if revised.total_part_payments.is_zero() {
        warnings.push("No part-payment was applied; schedules are identical".into());
    }

    let impact = PartPaymentImpact {
        interest_saved: baseline.total_interest - revised.total_interest,
        months_saved: baseline.periods.saturating_sub(revised.periods),
        installment_reduction: (baseline.final_installment - revised.final_installment)
            .max(Decimal::ZERO),
        baseline,
        revised,
    };
    log::debug!(
        "part-payment impact: {} months saved, interest saved {}",
        impact.months_saved,
        impact.interest_saved
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Part-payment impact (baseline vs revised amortization)",
        &serde_json::json!({
            "principal": input.terms.principal.to_string(),
            "annual_rate_percent": input.terms.annual_rate_percent.to_string(),
            "tenure_months": input.terms.tenure_months,
            "strategy": format!("{:?}", input.strategy),
        }),
        warnings,
        elapsed,
        impact,
    ))
}
