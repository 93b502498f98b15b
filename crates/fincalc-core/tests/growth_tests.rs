use fincalc_core::growth::{
    lump_sum_future_value, required_periodic_contribution, simulate_contribution,
    simulate_withdrawal, sip_future_value, InvestmentPlan, WithdrawalPlan,
};
use fincalc_core::{Frequency, RateConvention};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Contributions
// ===========================================================================

#[test]
fn test_published_sip_figure_under_nominal_rate() {
    // 10,000 a month at 12% for 10 years is quoted as about 23.23 lakh
    let plan = InvestmentPlan {
        rate_convention: RateConvention::Nominal,
        ..InvestmentPlan::sip(dec!(10_000), dec!(12), 10)
    };
    let out = simulate_contribution(&plan).unwrap();
    let s = &out.result.summary;
    assert!(
        (s.maturity_value - dec!(2_323_000)).abs() <= dec!(5_000),
        "maturity = {}",
        s.maturity_value
    );
    assert_eq!(s.total_contributed, dec!(1_200_000));
    assert_eq!(out.result.monthly_rate, dec!(0.01));
}

#[test]
fn test_simulation_matches_closed_form_for_flat_sip() {
    for convention in [RateConvention::Effective, RateConvention::Nominal] {
        let plan = InvestmentPlan {
            rate_convention: convention,
            ..InvestmentPlan::sip(dec!(25_000), dec!(11.5), 15)
        };
        let out = simulate_contribution(&plan).unwrap();
        let closed = sip_future_value(dec!(25_000), out.result.monthly_rate, 180).unwrap();
        assert!(
            (out.result.summary.maturity_value - closed).abs() < dec!(0.001),
            "{convention:?}"
        );
    }
}

#[test]
fn test_effective_convention_compounds_to_annual_rate() {
    let out = simulate_contribution(&InvestmentPlan::lump_sum(dec!(250_000), dec!(12), 8)).unwrap();
    let expected = lump_sum_future_value(dec!(250_000), dec!(0.12), 8).unwrap();
    assert!((out.result.summary.maturity_value - expected).abs() < dec!(0.001));
}

#[test]
fn test_inflation_and_tax_views() {
    let plan = InvestmentPlan {
        inflation_percent: dec!(6),
        tax_percent: dec!(10),
        ..InvestmentPlan::sip(dec!(5_000), dec!(12), 10)
    };
    let s = simulate_contribution(&plan).unwrap().result.summary;
    assert!(s.real_value < s.maturity_value);
    assert_eq!(s.tax_on_gains, s.wealth_gained * dec!(0.1));
    assert_eq!(s.post_tax_value, s.maturity_value - s.tax_on_gains);
    assert!(s.real_post_tax_value < s.real_value);
}

#[test]
fn test_step_up_beats_flat_sip() {
    let flat = simulate_contribution(&InvestmentPlan::sip(dec!(10_000), dec!(10), 10)).unwrap();
    let stepped = simulate_contribution(&InvestmentPlan {
        step_up_percent: dec!(10),
        ..InvestmentPlan::sip(dec!(10_000), dec!(10), 10)
    })
    .unwrap();
    assert!(stepped.result.summary.maturity_value > flat.result.summary.maturity_value);
    assert!(stepped.result.summary.total_contributed > dec!(1_200_000));
}

#[test]
fn test_required_contribution_reaches_target() {
    let target = dec!(10_000_000);
    let monthly = required_periodic_contribution(target, dec!(0.01), 180).unwrap();
    let plan = InvestmentPlan {
        rate_convention: RateConvention::Nominal,
        ..InvestmentPlan::sip(monthly, dec!(12), 15)
    };
    let reached = simulate_contribution(&plan).unwrap().result.summary.maturity_value;
    assert!((reached - target).abs() < dec!(0.01));
}

// ===========================================================================
// Withdrawals
// ===========================================================================

fn swp(corpus: Decimal, withdrawal: Decimal, years: u32) -> WithdrawalPlan {
    WithdrawalPlan {
        initial_corpus: corpus,
        withdrawal_amount: withdrawal,
        frequency_per_year: Frequency::Monthly,
        annual_return_percent: dec!(8),
        horizon_years: years,
        withdrawal_step_up_percent: Decimal::ZERO,
        inflation_percent: dec!(5),
        rate_convention: RateConvention::Effective,
    }
}

#[test]
fn test_zero_withdrawal_grows_like_lump_sum() {
    let out = simulate_withdrawal(&swp(dec!(2_000_000), Decimal::ZERO, 12)).unwrap();
    let expected = lump_sum_future_value(dec!(2_000_000), dec!(0.08), 12).unwrap();
    assert!((out.result.final_value - expected).abs() < dec!(0.01));
    assert!(out.result.depletion.is_none());
}

#[test]
fn test_heavy_withdrawal_depletes_with_fractional_timing() {
    let out = simulate_withdrawal(&swp(dec!(1_000_000), dec!(25_000), 20)).unwrap();
    let p = &out.result;
    let d = p.depletion.as_ref().expect("plan should deplete");

    assert!(d.final_withdrawal <= dec!(25_000));
    assert!(d.years_elapsed > Decimal::from(d.year - 1));
    assert!(d.years_elapsed <= Decimal::from(d.year));
    assert_eq!(p.entries.len() as u32, d.year);
    assert!(p.entries.last().unwrap().depleted);
    assert_eq!(p.final_value, Decimal::ZERO);
    assert!((p.total_withdrawn - (dec!(1_000_000) + p.total_returns)).abs() < dec!(0.000001));
}
