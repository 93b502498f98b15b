use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::pro_rata::{allocate_demands, override_customer_contribution, ProRataInput};

use crate::input;

/// Arguments for a pro-rata demand schedule
#[derive(Args)]
pub struct ProRataArgs {
    /// Path to JSON input file: cost sheet, sanctioned loan and demands
    #[arg(long)]
    pub input: Option<String>,

    /// Set a row's customer contribution, as ROW=AMOUNT (0-based row).
    /// May be repeated.
    #[arg(long = "customer", value_parser = parse_override)]
    pub overrides: Vec<(usize, Decimal)>,
}

fn parse_override(raw: &str) -> Result<(usize, Decimal), String> {
    let (row, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=AMOUNT, got '{raw}'"))?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad row '{row}': {e}"))?;
    let amount = amount
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("bad amount '{amount}': {e}"))?;
    Ok((row, amount))
}

pub fn run_pro_rata(args: ProRataArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pro_rata_input: ProRataInput = input::require_record(args.input.as_deref(), "pro-rata")?;
    let mut result = allocate_demands(&pro_rata_input)?;

    for (row, amount) in &args.overrides {
        result.result = override_customer_contribution(&result.result, *row, *amount)?;
        result
            .warnings
            .push(format!("Row {row} customer contribution set to {amount}"));
    }
    Ok(serde_json::to_value(result)?)
}
