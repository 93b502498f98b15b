use chrono::NaiveDate;
use fincalc_core::amortization::{
    build_schedule, compare_part_payments, compute_installment, generate_schedule,
    yearly_breakdown, AmortizationInput, LoanTerms, PartPayment, PrepaymentStrategy,
};
use fincalc_core::FinCalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Installment formula
// ===========================================================================

fn home_loan() -> LoanTerms {
    // 10 lakh at 8.5% over 20 years
    LoanTerms {
        principal: dec!(1_000_000),
        annual_rate_percent: dec!(8.5),
        tenure_months: 240,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
    }
}

#[test]
fn test_reference_home_loan_installment() {
    let emi = compute_installment(dec!(1_000_000), dec!(8.5), 240).unwrap();
    assert!((emi - dec!(8_678)).abs() <= dec!(1), "emi = {emi}");
}

#[test]
fn test_reference_home_loan_total_interest() {
    let out = generate_schedule(&home_loan(), &[]).unwrap();
    let s = &out.result;
    assert!(
        (s.total_interest - dec!(1_082_800)).abs() <= dec!(500),
        "interest = {}",
        s.total_interest
    );
    assert_eq!(s.periods, 240);
    assert!(!s.paid_off_early);
}

#[test]
fn test_zero_rate_is_rejected_by_strict_formula() {
    let err = compute_installment(dec!(100_000), Decimal::ZERO, 12).unwrap_err();
    assert!(matches!(err, FinCalcError::InvalidTerms { .. }));
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_schedule_retires_principal_exactly() {
    let out = generate_schedule(&home_loan(), &[]).unwrap();
    let s = &out.result;

    let last = s.entries.last().unwrap();
    assert_eq!(last.period, 240);
    assert_eq!(last.closing_balance, Decimal::ZERO);

    let principal: Decimal = s.entries.iter().map(|e| e.principal_component).sum();
    assert!((principal - dec!(1_000_000)).abs() < dec!(0.000001));

    for pair in s.entries.windows(2) {
        assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        assert!(pair[1].closing_balance <= pair[0].closing_balance);
    }
    assert!(s.entries.iter().all(|e| e.closing_balance >= Decimal::ZERO));
}

#[test]
fn test_installment_dates_advance_monthly() {
    let out = generate_schedule(&home_loan(), &[]).unwrap();
    let e = &out.result.entries;
    assert_eq!(e[0].date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    assert_eq!(e[12].date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    assert_eq!(
        out.result.payoff_date,
        NaiveDate::from_ymd_opt(2044, 12, 5).unwrap()
    );
}

#[test]
fn test_yearly_breakdown_totals_match() {
    let out = generate_schedule(&home_loan(), &[]).unwrap();
    let years = yearly_breakdown(&out.result.entries);
    assert_eq!(years.len(), 20);
    assert_eq!(years[0].installments, 12);
    let interest: Decimal = years.iter().map(|y| y.interest).sum();
    assert!((interest - out.result.total_interest).abs() < dec!(0.000001));
    assert_eq!(years.last().unwrap().closing_balance, Decimal::ZERO);
}

// ===========================================================================
// Part-payments
// ===========================================================================

fn ten_year_loan() -> LoanTerms {
    LoanTerms {
        principal: dec!(1_000_000),
        annual_rate_percent: dec!(10),
        tenure_months: 120,
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    }
}

#[test]
fn test_part_payment_shortens_loan_and_saves_interest() {
    let terms = ten_year_loan();
    let pp = [PartPayment {
        period_index: 12,
        amount: dec!(100_000),
    }];

    let baseline = generate_schedule(&terms, &[]).unwrap().result;
    let revised = generate_schedule(&terms, &pp).unwrap().result;

    assert!(revised.periods < baseline.periods);
    assert!(revised.total_interest < baseline.total_interest);
    assert!(revised.paid_off_early);
    assert_eq!(revised.entries[11].part_payment, dec!(100_000));
    assert_eq!(revised.entries.last().unwrap().closing_balance, Decimal::ZERO);

    let impact = compare_part_payments(&AmortizationInput {
        terms,
        part_payments: pp.to_vec(),
        strategy: PrepaymentStrategy::ReduceTenure,
    })
    .unwrap()
    .result;
    assert!(impact.interest_saved > Decimal::ZERO);
    assert!(impact.months_saved > 0);
    assert_eq!(
        impact.interest_saved,
        baseline.total_interest - revised.total_interest
    );
}

#[test]
fn test_part_payment_beyond_tenure_is_ignored_with_warning() {
    let pp = [PartPayment {
        period_index: 121,
        amount: dec!(50_000),
    }];
    let out = generate_schedule(&ten_year_loan(), &pp).unwrap();
    assert_eq!(out.result.total_part_payments, Decimal::ZERO);
    assert_eq!(out.result.periods, 120);
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_part_payment_larger_than_balance_clears_loan() {
    let pp = [PartPayment {
        period_index: 3,
        amount: dec!(5_000_000),
    }];
    let out = generate_schedule(&ten_year_loan(), &pp).unwrap();
    let s = &out.result;
    assert_eq!(s.periods, 3);
    assert_eq!(s.entries[2].closing_balance, Decimal::ZERO);
    assert!(s.total_part_payments < dec!(1_000_000));
}

#[test]
fn test_reduce_installment_keeps_tenure() {
    let out = build_schedule(&AmortizationInput {
        terms: ten_year_loan(),
        part_payments: vec![PartPayment {
            period_index: 24,
            amount: dec!(200_000),
        }],
        strategy: PrepaymentStrategy::ReduceInstallment,
    })
    .unwrap();
    let s = &out.result;
    assert_eq!(s.periods, 120);
    assert!(s.final_installment < s.installment);
    assert!((s.entries[24].installment - s.final_installment).abs() < dec!(0.000001));
    assert_eq!(s.entries.last().unwrap().closing_balance, Decimal::ZERO);
}
