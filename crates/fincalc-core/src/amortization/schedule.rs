use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use super::installment::{level_payment, monthly_rate, MAX_TENURE_MONTHS};
use crate::error::FinCalcError;
use crate::types::*;
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub tenure_months: u32,
    /// Due date of the first installment.
    pub start_date: NaiveDate,
}

impl LoanTerms {
    pub fn validate(&self) -> FinCalcResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(FinCalcError::terms("principal", "principal must be positive"));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(FinCalcError::terms(
                "annual_rate_percent",
                "rate cannot be negative",
            ));
        }
        if self.tenure_months == 0 {
            return Err(FinCalcError::terms("tenure_months", "tenure must be at least 1 month"));
        }
        if self.tenure_months > MAX_TENURE_MONTHS {
            return Err(FinCalcError::terms(
                "tenure_months",
                format!("tenure cannot exceed {MAX_TENURE_MONTHS} months"),
            ));
        }
        Ok(())
    }

    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.annual_rate_percent)
    }

    /// Due date of installment `period` (1-based).
    pub fn installment_date(&self, period: u32) -> FinCalcResult<NaiveDate> {
        self.start_date
            .checked_add_months(Months::new(period.saturating_sub(1)))
            .ok_or_else(|| {
                FinCalcError::DateError(format!(
                    "installment {period} after {} is out of calendar range",
                    self.start_date
                ))
            })
    }
}

/// An extra principal payment made together with installment `period_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartPayment {
    pub period_index: u32,
    pub amount: Money,
}

impl PartPayment {
    pub fn check_within(&self, tenure_months: u32) -> FinCalcResult<()> {
        if self.period_index > tenure_months {
            return Err(FinCalcError::PartPaymentOutOfRange {
                period: self.period_index,
                tenure_months,
            });
        }
        Ok(())
    }
}

/// What a part-payment buys back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrepaymentStrategy {
    /// Keep the installment, finish early.
    #[default]
    ReduceTenure,
    /// Keep the tenure, re-level the installment over the remaining months.
    ReduceInstallment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(default)]
    pub part_payments: Vec<PartPayment>,
    #[serde(default)]
    pub strategy: PrepaymentStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub period: u32,
    pub date: NaiveDate,
    pub opening_balance: Money,
    pub installment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub part_payment: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// Installment at the start of the loan.
    pub installment: Money,
    /// Installment in force at the end; differs only under `ReduceInstallment`.
    pub final_installment: Money,
    pub entries: Vec<AmortizationEntry>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_part_payments: Money,
    pub total_paid: Money,
    pub periods: u32,
    pub payoff_date: NaiveDate,
    pub paid_off_early: bool,
}

/// Headline figures of a schedule, without the period rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub installment: Money,
    pub final_installment: Money,
    pub total_interest: Money,
    pub total_part_payments: Money,
    pub total_paid: Money,
    pub periods: u32,
    pub payoff_date: NaiveDate,
}

impl AmortizationSchedule {
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            installment: self.installment,
            final_installment: self.final_installment,
            total_interest: self.total_interest,
            total_part_payments: self.total_part_payments,
            total_paid: self.total_paid,
            periods: self.periods,
            payoff_date: self.payoff_date,
        }
    }
}

/// Calendar-year roll-up of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyAmortization {
    pub year: i32,
    pub installments: u32,
    pub principal: Money,
    pub interest: Money,
    pub part_payments: Money,
    pub closing_balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Full amortization schedule with the default `ReduceTenure` treatment of
/// part-payments.
pub fn generate_schedule(
    terms: &LoanTerms,
    part_payments: &[PartPayment],
) -> FinCalcResult<ComputationOutput<AmortizationSchedule>> {
    build_schedule(&AmortizationInput {
        terms: terms.clone(),
        part_payments: part_payments.to_vec(),
        strategy: PrepaymentStrategy::ReduceTenure,
    })
}

/// Full amortization schedule for terms, part-payments and strategy.
pub fn build_schedule(
    input: &AmortizationInput,
) -> FinCalcResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = run_schedule(input, &mut warnings)?;
    log::debug!(
        "amortization: {} of {} periods, total interest {}",
        schedule.periods,
        input.terms.tenure_months,
        schedule.total_interest
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-balance amortization (equated monthly installments)",
        &serde_json::json!({
            "principal": input.terms.principal.to_string(),
            "annual_rate_percent": input.terms.annual_rate_percent.to_string(),
            "tenure_months": input.terms.tenure_months,
            "part_payments": input.part_payments.len(),
            "strategy": format!("{:?}", input.strategy),
        }),
        warnings,
        elapsed,
        schedule,
    ))
}

/// Roll a schedule up by calendar year of the installment date.
pub fn yearly_breakdown(entries: &[AmortizationEntry]) -> Vec<YearlyAmortization> {
    let mut years: Vec<YearlyAmortization> = Vec::new();
    for e in entries {
        let year = e.date.year();
        match years.last_mut() {
            Some(row) if row.year == year => {
                row.installments += 1;
                row.principal += e.principal_component;
                row.interest += e.interest_component;
                row.part_payments += e.part_payment;
                row.closing_balance = e.closing_balance;
            }
            _ => years.push(YearlyAmortization {
                year,
                installments: 1,
                principal: e.principal_component,
                interest: e.interest_component,
                part_payments: e.part_payment,
                closing_balance: e.closing_balance,
            }),
        }
    }
    years
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

pub(crate) fn run_schedule(
    input: &AmortizationInput,
    warnings: &mut Vec<String>,
) -> FinCalcResult<AmortizationSchedule> {
    let terms = &input.terms;
    terms.validate()?;

    let rate = terms.monthly_rate();
    let tenure = terms.tenure_months;
    let part_payments = index_part_payments(&input.part_payments, tenure, warnings)?;

    let initial_installment = level_payment(terms.principal, rate, tenure)?;
    // running totals stay below the level installment over the full tenure
    if initial_installment.checked_mul(Decimal::from(tenure)).is_none() {
        return Err(FinCalcError::terms("principal", "total payable is not representable"));
    }
    let mut installment = initial_installment;
    let mut balance = terms.principal;
    let mut entries = Vec::with_capacity(tenure as usize);

    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_part_payments = Decimal::ZERO;

    for period in 1..=tenure {
        let opening = balance;
        let interest = opening * rate;

        let mut principal = installment - interest;
        if principal > opening || period == tenure {
            // Last installment (or one that would overshoot) settles the balance
            principal = opening;
        }
        let after_installment = opening - principal;

        let part_payment = part_payments
            .get(&period)
            .map(|amount| (*amount).min(after_installment))
            .unwrap_or(Decimal::ZERO);
        let closing = (after_installment - part_payment).max(Decimal::ZERO);

        total_interest += interest;
        total_principal += principal;
        total_part_payments += part_payment;

        entries.push(AmortizationEntry {
            period,
            date: terms.installment_date(period)?,
            opening_balance: opening,
            installment: principal + interest,
            principal_component: principal,
            interest_component: interest,
            part_payment,
            closing_balance: closing,
        });

        balance = closing;
        if closing.is_zero() {
            break;
        }

        if part_payment > Decimal::ZERO && input.strategy == PrepaymentStrategy::ReduceInstallment
        {
            installment = level_payment(closing, rate, tenure - period)?;
        }
    }

    let periods = entries.len() as u32;
    for (period, _) in part_payments.range(periods + 1..) {
        warnings.push(format!(
            "Part-payment at period {period} ignored: loan is repaid in period {periods}"
        ));
    }

    let payoff_date = entries
        .last()
        .map(|e| e.date)
        .unwrap_or(terms.start_date);

    Ok(AmortizationSchedule {
        installment: initial_installment,
        final_installment: installment,
        entries,
        total_interest,
        total_principal,
        total_part_payments,
        total_paid: total_interest + total_principal + total_part_payments,
        periods,
        payoff_date,
        paid_off_early: periods < tenure,
    })
}

/// Key part-payments by period. Later entries for the same period win;
/// entries beyond the tenure are dropped with a warning.
fn index_part_payments(
    part_payments: &[PartPayment],
    tenure_months: u32,
    warnings: &mut Vec<String>,
) -> FinCalcResult<BTreeMap<u32, Money>> {
    let mut by_period = BTreeMap::new();

    for pp in part_payments {
        if pp.period_index == 0 {
            return Err(FinCalcError::terms(
                "part_payments.period_index",
                "periods are numbered from 1",
            ));
        }
        if pp.amount <= Decimal::ZERO {
            return Err(FinCalcError::terms(
                "part_payments.amount",
                format!("part-payment at period {} must be positive", pp.period_index),
            ));
        }
        if let Err(e) = pp.check_within(tenure_months) {
            warnings.push(format!("{e}; ignored"));
            continue;
        }
        if by_period.insert(pp.period_index, pp.amount).is_some() {
            warnings.push(format!(
                "Duplicate part-payment at period {}; the later entry replaces the earlier one",
                pp.period_index
            ));
        }
    }

    Ok(by_period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(120_000),
            annual_rate_percent: dec!(12),
            tenure_months: 12,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        }
    }

    #[test]
    fn test_schedule_runs_full_tenure() {
        let out = generate_schedule(&sample_terms(), &[]).unwrap();
        let s = &out.result;
        assert_eq!(s.periods, 12);
        assert!(!s.paid_off_early);
        assert_eq!(s.entries.last().unwrap().closing_balance, Decimal::ZERO);
        assert!((s.total_principal - dec!(120_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_first_period_split() {
        let out = generate_schedule(&sample_terms(), &[]).unwrap();
        let first = &out.result.entries[0];
        // 1% of 120,000
        assert_eq!(first.interest_component, dec!(1200));
        assert_eq!(first.principal_component + first.interest_component, first.installment);
        assert_eq!(first.opening_balance, dec!(120_000));
    }

    #[test]
    fn test_installment_dates_step_monthly() {
        let out = generate_schedule(&sample_terms(), &[]).unwrap();
        let dates: Vec<_> = out.result.entries.iter().map(|e| e.date).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(dates[11], NaiveDate::from_ymd_opt(2024, 12, 5).unwrap());
        assert_eq!(out.result.payoff_date, dates[11]);
    }

    #[test]
    fn test_zero_rate_schedule_is_linear() {
        let mut terms = sample_terms();
        terms.annual_rate_percent = Decimal::ZERO;
        let out = generate_schedule(&terms, &[]).unwrap();
        assert!(out.result.entries.iter().all(|e| e.installment == dec!(10_000)));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_oversized_part_payment_clamps_and_stops() {
        let pp = [PartPayment { period_index: 3, amount: dec!(10_000_000) }];
        let out = generate_schedule(&sample_terms(), &pp).unwrap();
        let s = &out.result;
        assert_eq!(s.periods, 3);
        assert!(s.paid_off_early);
        let last = s.entries.last().unwrap();
        assert_eq!(last.closing_balance, Decimal::ZERO);
        assert_eq!(last.part_payment, last.opening_balance - last.principal_component);
        assert!((s.total_principal + s.total_part_payments - dec!(120_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_part_payment_beyond_tenure_is_noop() {
        let pp = [PartPayment { period_index: 13, amount: dec!(5_000) }];
        let with = generate_schedule(&sample_terms(), &pp).unwrap();
        let without = generate_schedule(&sample_terms(), &[]).unwrap();
        assert_eq!(with.result, without.result);
        assert_eq!(with.warnings.len(), 1);
    }

    #[test]
    fn test_part_payment_after_payoff_ignored() {
        let pp = [
            PartPayment { period_index: 2, amount: dec!(200_000) },
            PartPayment { period_index: 6, amount: dec!(1_000) },
        ];
        let out = generate_schedule(&sample_terms(), &pp).unwrap();
        assert_eq!(out.result.periods, 2);
        assert!(out.warnings.iter().any(|w| w.contains("period 6")));
    }

    #[test]
    fn test_duplicate_part_payment_later_wins() {
        let pp = [
            PartPayment { period_index: 4, amount: dec!(1_000) },
            PartPayment { period_index: 4, amount: dec!(2_500) },
        ];
        let out = generate_schedule(&sample_terms(), &pp).unwrap();
        assert_eq!(out.result.entries[3].part_payment, dec!(2_500));
        assert_eq!(out.result.total_part_payments, dec!(2_500));
    }

    #[test]
    fn test_reduce_installment_keeps_tenure() {
        let input = AmortizationInput {
            terms: sample_terms(),
            part_payments: vec![PartPayment { period_index: 6, amount: dec!(20_000) }],
            strategy: PrepaymentStrategy::ReduceInstallment,
        };
        let out = build_schedule(&input).unwrap();
        let s = &out.result;
        assert_eq!(s.periods, 12);
        assert!(s.final_installment < s.installment);
        assert_eq!(s.entries[6].installment.round_dp(6), s.final_installment.round_dp(6));
    }

    #[test]
    fn test_invalid_part_payment_rejected() {
        let zero = [PartPayment { period_index: 2, amount: Decimal::ZERO }];
        assert!(generate_schedule(&sample_terms(), &zero).is_err());
        let period_zero = [PartPayment { period_index: 0, amount: dec!(10) }];
        assert!(generate_schedule(&sample_terms(), &period_zero).is_err());
    }

    #[test]
    fn test_check_within_reports_out_of_range() {
        let pp = PartPayment { period_index: 30, amount: dec!(1) };
        assert!(matches!(
            pp.check_within(24),
            Err(FinCalcError::PartPaymentOutOfRange { period: 30, tenure_months: 24 })
        ));
        assert!(pp.check_within(30).is_ok());
    }

    #[test]
    fn test_invalid_terms_rejected() {
        let mut terms = sample_terms();
        terms.principal = Decimal::ZERO;
        assert!(generate_schedule(&terms, &[]).is_err());

        let mut terms = sample_terms();
        terms.tenure_months = MAX_TENURE_MONTHS + 1;
        assert!(generate_schedule(&terms, &[]).is_err());

        let mut terms = sample_terms();
        terms.annual_rate_percent = dec!(-1);
        assert!(generate_schedule(&terms, &[]).is_err());
    }

    #[test]
    fn test_yearly_breakdown_groups_by_calendar_year() {
        let mut terms = sample_terms();
        terms.tenure_months = 24;
        terms.start_date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let out = generate_schedule(&terms, &[]).unwrap();
        let years = yearly_breakdown(&out.result.entries);

        assert_eq!(years.len(), 3);
        assert_eq!(years[0].year, 2024);
        assert_eq!(years[0].installments, 6);
        assert_eq!(years[1].installments, 12);
        assert_eq!(years[2].installments, 6);
        assert_eq!(years[2].closing_balance, Decimal::ZERO);
        let principal: Decimal = years.iter().map(|y| y.principal).sum();
        assert!((principal - dec!(120_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_unrepresentable_total_rejected() {
        let mut terms = sample_terms();
        terms.principal = Decimal::MAX / dec!(1.0001);
        terms.annual_rate_percent = dec!(0.001);
        terms.tenure_months = MAX_TENURE_MONTHS;
        assert!(matches!(
            generate_schedule(&terms, &[]).unwrap_err(),
            FinCalcError::InvalidTerms { ref field, .. } if field == "principal"
        ));
    }
}
