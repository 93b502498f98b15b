//! Compound-growth simulation: periodic and lump-sum investing, systematic
//! withdrawals, and the inflation / tax views over their results.

pub mod adjustments;
pub mod contribution;
pub mod entry;
pub mod formulas;
pub mod withdrawal;

/// Longest investment horizon the simulators accept.
pub const MAX_HORIZON_YEARS: u32 = 100;

pub use adjustments::{inflation_adjusted, summarize_growth, GrowthSummary};
pub use contribution::{
    simulate_contribution, ContributionPattern, ContributionProjection, InvestmentPlan,
    StepUpFrequency,
};
pub use entry::GrowthPeriodEntry;
pub use formulas::{lump_sum_future_value, required_periodic_contribution, sip_future_value};
pub use withdrawal::{simulate_withdrawal, Depletion, WithdrawalPlan, WithdrawalProjection};
