use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::cost::{contribution_ratio, ContributionRatio, CostSheet};
use crate::error::FinCalcError;
use crate::types::*;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandInput {
    pub label: String,
    pub percent_of_total: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProRataInput {
    pub cost: CostSheet,
    pub sanctioned_loan: Money,
    pub demands: Vec<DemandInput>,
}

/// Where a demand sits in the schedule, which decides who funds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DemandPosition {
    /// Booking amount; always paid by the customer.
    FirstDemand,
    /// Split by the contribution ratio when `pro_rata`, otherwise paid by
    /// the customer.
    MiddleDemand { pro_rata: bool },
    /// Balancing demand; the bank disburses whatever of the loan is left.
    LastDemand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandScheduleRow {
    pub label: String,
    pub position: DemandPosition,
    pub percent_of_total: Percent,
    pub amount: Money,
    pub bank_contribution: Money,
    pub customer_contribution: Money,
}

impl DemandScheduleRow {
    /// Set the customer's share directly; the bank funds the remainder.
    pub fn set_customer_contribution(&mut self, value: Money) {
        let customer = value.clamp(Decimal::ZERO, self.amount);
        self.customer_contribution = customer;
        self.bank_contribution = self.amount - customer;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSchedule {
    pub total_cost: Money,
    pub sanctioned_loan: Money,
    pub ratio: ContributionRatio,
    pub rows: Vec<DemandScheduleRow>,
    pub total_percent: Percent,
    pub total_amount: Money,
    pub total_bank: Money,
    pub total_customer: Money,
}

impl DemandSchedule {
    fn recompute_totals(&mut self) {
        self.total_percent = self.rows.iter().map(|r| r.percent_of_total).sum();
        self.total_amount = self.rows.iter().map(|r| r.amount).sum();
        self.total_bank = self.rows.iter().map(|r| r.bank_contribution).sum();
        self.total_customer = self.rows.iter().map(|r| r.customer_contribution).sum();
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Position of every row in a schedule of `count` demands.
///
/// The first row is the booking demand and the final row (when there is more
/// than one) balances the loan. Rows in between are split pro rata only from
/// the third position on, and only in schedules longer than three demands.
pub fn classify_demands(count: usize) -> Vec<DemandPosition> {
    (0..count)
        .map(|index| {
            if index == 0 {
                DemandPosition::FirstDemand
            } else if index == count - 1 {
                DemandPosition::LastDemand
            } else {
                DemandPosition::MiddleDemand {
                    pro_rata: count > 3 && index >= 2,
                }
            }
        })
        .collect()
}

/// Build the demand schedule and split each demand between bank and
/// customer.
pub fn allocate_demands(input: &ProRataInput) -> FinCalcResult<ComputationOutput<DemandSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let total_cost = input.cost.total_cost()?;
    let ratio = contribution_ratio(total_cost, input.sanctioned_loan)?;
    if input.sanctioned_loan > total_cost {
        warnings.push(format!(
            "Sanctioned loan {} exceeds total cost {}; bank share capped at 100%",
            input.sanctioned_loan, total_cost
        ));
    }

    let positions = classify_demands(input.demands.len());
    let bank_rate = percent_to_rate(ratio.bank_percent);
    let mut bank_so_far = Decimal::ZERO;
    let mut allocated = Decimal::ZERO;
    let unrepresentable = |label: &str| {
        FinCalcError::input(
            "percent_of_total",
            format!("demand '{label}' is not representable"),
        )
    };
    let mut rows = Vec::with_capacity(input.demands.len());

    for (demand, position) in input.demands.iter().zip(positions) {
        let amount = total_cost
            .checked_mul(percent_to_rate(demand.percent_of_total))
            .map(to_cents)
            .ok_or_else(|| unrepresentable(&demand.label))?;
        allocated = allocated
            .checked_add(amount)
            .ok_or_else(|| unrepresentable(&demand.label))?;
        let bank = match position {
            DemandPosition::FirstDemand | DemandPosition::MiddleDemand { pro_rata: false } => {
                Decimal::ZERO
            }
            DemandPosition::MiddleDemand { pro_rata: true } => to_cents(amount * bank_rate),
            DemandPosition::LastDemand => {
                (input.sanctioned_loan - bank_so_far).clamp(Decimal::ZERO, amount)
            }
        };
        bank_so_far += bank;
        rows.push(DemandScheduleRow {
            label: demand.label.clone(),
            position,
            percent_of_total: demand.percent_of_total,
            amount,
            bank_contribution: bank,
            customer_contribution: amount - bank,
        });
    }

    if bank_so_far > input.sanctioned_loan {
        warnings.push(format!(
            "Pro-rata disbursements of {} exceed the sanctioned loan {}; \
             the last demand carries no bank share",
            bank_so_far, input.sanctioned_loan
        ));
    }

    let mut schedule = DemandSchedule {
        total_cost,
        sanctioned_loan: input.sanctioned_loan,
        ratio,
        rows,
        total_percent: Decimal::ZERO,
        total_amount: Decimal::ZERO,
        total_bank: Decimal::ZERO,
        total_customer: Decimal::ZERO,
    };
    schedule.recompute_totals();

    if schedule.total_percent != dec!(100) {
        warnings.push(format!(
            "Demand percentages sum to {}%, not 100%",
            schedule.total_percent
        ));
    }
    log::debug!(
        "pro-rata: {} demands, bank {} / customer {}",
        schedule.rows.len(),
        schedule.total_bank,
        schedule.total_customer
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pro-rata demand allocation (booking demand customer-funded, last demand balances the loan)",
        &serde_json::json!({
            "total_cost": total_cost.to_string(),
            "sanctioned_loan": input.sanctioned_loan.to_string(),
            "bank_percent": ratio.bank_percent.to_string(),
            "customer_percent": ratio.customer_percent.to_string(),
            "demands": input.demands.len(),
        }),
        warnings,
        elapsed,
        schedule,
    ))
}

/// Apply a customer-side edit to one row and return the schedule with its
/// totals recomputed.
pub fn override_customer_contribution(
    schedule: &DemandSchedule,
    index: usize,
    customer_contribution: Money,
) -> FinCalcResult<DemandSchedule> {
    if index >= schedule.rows.len() {
        return Err(FinCalcError::input(
            "index",
            format!("row {index} is outside a schedule of {}", schedule.rows.len()),
        ));
    }
    let mut edited = schedule.clone();
    edited.rows[index].set_customer_contribution(customer_contribution);
    edited.recompute_totals();
    Ok(edited)
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn to_cents(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn validate(input: &ProRataInput) -> FinCalcResult<()> {
    input.cost.validate()?;
    if input.sanctioned_loan < Decimal::ZERO {
        return Err(FinCalcError::input(
            "sanctioned_loan",
            "sanctioned loan cannot be negative",
        ));
    }
    if input.demands.is_empty() {
        return Err(FinCalcError::input("demands", "at least one demand is required"));
    }
    if let Some(d) = input.demands.iter().find(|d| d.percent_of_total < Decimal::ZERO) {
        return Err(FinCalcError::input(
            "percent_of_total",
            format!("demand '{}' has a negative share", d.label),
        ));
    }
    input
        .demands
        .iter()
        .try_fold(Decimal::ZERO, |sum, d| sum.checked_add(d.percent_of_total))
        .ok_or_else(|| FinCalcError::input("percent_of_total", "percentages overflow"))?;
    Ok(())
}
