use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use fincalc_core::eligibility::{estimate_eligibility, EligibilityProfile};

use crate::input;

/// Arguments for loan eligibility
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly installments
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub obligations: Decimal,

    /// Fixed obligation to income ratio in percent (clamped to 15-80)
    #[arg(long, default_value_t = dec!(50))]
    pub foir: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan tenure in years
    #[arg(long)]
    pub tenure_years: Option<u32>,
}

pub fn run_eligibility(args: EligibilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile: EligibilityProfile = match input::read_record(args.input.as_deref())? {
        Some(profile) => profile,
        None => EligibilityProfile {
            monthly_income: args.income.ok_or("--income is required (or provide --input)")?,
            existing_obligations: args.obligations,
            foir_percent: args.foir,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            tenure_years: args
                .tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
        },
    };
    let result = estimate_eligibility(&profile)?;
    Ok(serde_json::to_value(result)?)
}
