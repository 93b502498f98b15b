use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::amortization::{
    build_schedule, compare_part_payments, quote_installment, yearly_breakdown,
    AmortizationInput,
};

use crate::input;

/// Arguments for the EMI calculator
#[derive(Args)]
pub struct EmiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (8.5 = 8.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long, alias = "months")]
    pub tenure_months: Option<u32>,
}

#[derive(serde::Deserialize)]
struct EmiRecord {
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
}

/// Arguments for a full amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file: loan terms, optional part_payments and strategy
    #[arg(long)]
    pub input: Option<String>,

    /// Roll the schedule up by calendar year
    #[arg(long)]
    pub yearly: bool,
}

/// Arguments for comparing a loan with and without part-payments
#[derive(Args)]
pub struct PartPaymentArgs {
    /// Path to JSON input file: loan terms, part_payments and strategy
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: EmiRecord = match input::read_record(args.input.as_deref())? {
        Some(record) => record,
        None => EmiRecord {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            tenure_months: args
                .tenure_months
                .ok_or("--tenure-months is required (or provide --input)")?,
        },
    };
    let result = quote_installment(
        record.principal,
        record.annual_rate_percent,
        record.tenure_months,
    )?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput =
        input::require_record(args.input.as_deref(), "schedule")?;
    let result = build_schedule(&schedule_input)?;

    let mut value = serde_json::to_value(&result)?;
    if args.yearly {
        let years = yearly_breakdown(&result.result.entries);
        value["result"]["entries"] = serde_json::to_value(years)?;
    }
    Ok(value)
}

pub fn run_part_payment(args: PartPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: AmortizationInput =
        input::require_record(args.input.as_deref(), "part-payment")?;
    let result = compare_part_payments(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
