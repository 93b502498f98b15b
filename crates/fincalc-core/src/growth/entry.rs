use serde::{Deserialize, Serialize};

use crate::types::Money;

/// One year of a growth or withdrawal trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPeriodEntry {
    /// Year number, 1-based.
    pub period_index: u32,
    pub opening_value: Money,
    /// Money put in during the year; negative for withdrawals.
    pub contribution: Money,
    pub returns_earned: Money,
    pub closing_value: Money,
    /// Running total of `contribution`, plus any opening corpus for
    /// accumulation plans.
    pub cumulative_contribution: Money,
    /// The balance ran out during this year.
    #[serde(default)]
    pub depleted: bool,
}
