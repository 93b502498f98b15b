use clap::Args;
use serde_json::Value;

use fincalc_core::retirement::{project_retirement, RetirementInput};

use crate::input;

/// Arguments for a retirement projection
#[derive(Args)]
pub struct RetirementArgs {
    /// Path to JSON input file with ages, savings, returns and expenses
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_retirement(args: RetirementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let retirement_input: RetirementInput =
        input::require_record(args.input.as_deref(), "retirement")?;
    let result = project_retirement(&retirement_input)?;
    Ok(serde_json::to_value(result)?)
}
