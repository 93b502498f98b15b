mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{EmiArgs, PartPaymentArgs, ScheduleArgs};
use commands::eligibility::EligibilityArgs;
use commands::growth::{SipArgs, SwpArgs};
use commands::pro_rata::ProRataArgs;
use commands::retirement::RetirementArgs;

/// Loan, investment and retirement calculators
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Loan, investment and retirement calculators",
    long_about = "A CLI for personal-finance calculations with decimal precision. \
                  Supports EMI and amortization schedules with part-payments, SIP and \
                  SWP projections, retirement corpus planning, loan eligibility and \
                  pro-rata demand schedules."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Equated monthly installment and total interest
    Emi(EmiArgs),
    /// Month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Interest and tenure saved by part-payments
    PartPayment(PartPaymentArgs),
    /// SIP, step-up SIP or lump-sum growth
    Sip(SipArgs),
    /// Systematic withdrawal plan and depletion
    Swp(SwpArgs),
    /// Retirement corpus projection and gap
    Retirement(RetirementArgs),
    /// Maximum loan for an income and FOIR
    Eligibility(EligibilityArgs),
    /// Split construction-linked demands between bank and customer
    ProRata(ProRataArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::amortization::run_emi(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::PartPayment(args) => commands::amortization::run_part_payment(args),
        Commands::Sip(args) => commands::growth::run_sip(args),
        Commands::Swp(args) => commands::growth::run_swp(args),
        Commands::Retirement(args) => commands::retirement::run_retirement(args),
        Commands::Eligibility(args) => commands::eligibility::run_eligibility(args),
        Commands::ProRata(args) => commands::pro_rata::run_pro_rata(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
