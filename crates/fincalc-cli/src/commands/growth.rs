use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::growth::{
    simulate_contribution, simulate_withdrawal, ContributionPattern, InvestmentPlan,
    WithdrawalPlan,
};
use fincalc_core::{Frequency, RateConvention};

use crate::input;

/// Arguments for SIP, step-up SIP and lump-sum projections
#[derive(Args)]
pub struct SipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount invested each period (or once, with --lump-sum)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long, alias = "return")]
    pub annual_return: Option<Decimal>,

    /// Investment horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Contributions per year: 1, 2, 4 or 12
    #[arg(long, default_value_t = 12)]
    pub frequency: u32,

    /// Yearly increase of the contribution in percent
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub step_up: Decimal,

    /// Annual inflation in percent, for the real-value view
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub inflation: Decimal,

    /// Flat tax on gains in percent
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub tax: Decimal,

    /// Invest the amount once instead of every period
    #[arg(long)]
    pub lump_sum: bool,

    /// Use annual rate / 12 as the monthly rate instead of the equivalent
    /// compounded rate
    #[arg(long)]
    pub nominal: bool,
}

/// Arguments for a systematic withdrawal plan
#[derive(Args)]
pub struct SwpArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Corpus at the start of the plan
    #[arg(long)]
    pub corpus: Option<Decimal>,

    /// Amount withdrawn each period
    #[arg(long)]
    pub withdrawal: Option<Decimal>,

    /// Expected annual return in percent
    #[arg(long, alias = "return")]
    pub annual_return: Option<Decimal>,

    /// Plan length in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Withdrawals per year: 1, 2, 4 or 12
    #[arg(long, default_value_t = 12)]
    pub frequency: u32,

    /// Yearly increase of the withdrawal in percent
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub step_up: Decimal,

    /// Annual inflation in percent, for the real-value view
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub inflation: Decimal,

    /// Use annual rate / periods as the periodic rate
    #[arg(long)]
    pub nominal: bool,
}

fn convention(nominal: bool) -> RateConvention {
    if nominal {
        RateConvention::Nominal
    } else {
        RateConvention::Effective
    }
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan: InvestmentPlan = match input::read_record(args.input.as_deref())? {
        Some(plan) => plan,
        None => InvestmentPlan {
            contribution_amount: args
                .amount
                .ok_or("--amount is required (or provide --input)")?,
            annual_return_percent: args
                .annual_return
                .ok_or("--annual-return is required (or provide --input)")?,
            horizon_years: args.years.ok_or("--years is required (or provide --input)")?,
            frequency_per_year: Frequency::try_from(args.frequency)?,
            step_up_percent: args.step_up,
            step_up_frequency: Default::default(),
            inflation_percent: args.inflation,
            tax_percent: args.tax,
            pattern: if args.lump_sum {
                ContributionPattern::LumpSum
            } else {
                ContributionPattern::Periodic
            },
            rate_convention: convention(args.nominal),
            initial_corpus: Decimal::ZERO,
        },
    };
    let result = simulate_contribution(&plan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_swp(args: SwpArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan: WithdrawalPlan = match input::read_record(args.input.as_deref())? {
        Some(plan) => plan,
        None => WithdrawalPlan {
            initial_corpus: args.corpus.ok_or("--corpus is required (or provide --input)")?,
            withdrawal_amount: args
                .withdrawal
                .ok_or("--withdrawal is required (or provide --input)")?,
            frequency_per_year: Frequency::try_from(args.frequency)?,
            annual_return_percent: args
                .annual_return
                .ok_or("--annual-return is required (or provide --input)")?,
            horizon_years: args.years.ok_or("--years is required (or provide --input)")?,
            withdrawal_step_up_percent: args.step_up,
            inflation_percent: args.inflation,
            rate_convention: convention(args.nominal),
        },
    };
    let result = simulate_withdrawal(&plan)?;
    Ok(serde_json::to_value(result)?)
}
