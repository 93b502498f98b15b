use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinCalcError;
use crate::types::{percent_to_rate, Money, Percent};
use crate::FinCalcResult;

/// What the property costs the buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSheet {
    pub base_cost: Money,
    /// Parking, club membership and other charges billed with the unit.
    #[serde(default)]
    pub additional_charges: Money,
    /// Tax levied on base cost plus charges.
    #[serde(default)]
    pub tax_percent: Percent,
}

impl CostSheet {
    pub fn validate(&self) -> FinCalcResult<()> {
        if self.base_cost <= Decimal::ZERO {
            return Err(FinCalcError::input("base_cost", "base cost must be positive"));
        }
        if self.additional_charges < Decimal::ZERO {
            return Err(FinCalcError::input(
                "additional_charges",
                "charges cannot be negative",
            ));
        }
        if self.tax_percent < Decimal::ZERO {
            return Err(FinCalcError::input("tax_percent", "tax cannot be negative"));
        }
        Ok(())
    }

    /// Cost including tax, to the cent.
    pub fn total_cost(&self) -> FinCalcResult<Money> {
        let tax_factor = Decimal::ONE + percent_to_rate(self.tax_percent);
        self.base_cost
            .checked_add(self.additional_charges)
            .and_then(|pre_tax| pre_tax.checked_mul(tax_factor))
            .map(|total| total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .ok_or_else(|| FinCalcError::input("tax_percent", "total cost is not representable"))
    }
}

/// Whole-percent split of the cost between bank and customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRatio {
    pub bank_percent: Percent,
    pub customer_percent: Percent,
}

/// Bank share is the sanctioned loan over the total cost, rounded up to a
/// whole percent and capped at 100; the customer funds the rest.
pub fn contribution_ratio(
    total_cost: Money,
    sanctioned_loan: Money,
) -> FinCalcResult<ContributionRatio> {
    if total_cost <= Decimal::ZERO {
        return Err(FinCalcError::input("total_cost", "total cost must be positive"));
    }
    if sanctioned_loan < Decimal::ZERO {
        return Err(FinCalcError::input(
            "sanctioned_loan",
            "sanctioned loan cannot be negative",
        ));
    }
    // a share too large to represent is far above 100%
    let bank_percent = sanctioned_loan
        .checked_div(total_cost)
        .and_then(|share| share.checked_mul(dec!(100)))
        .map_or(dec!(100), |pct| pct.ceil())
        .clamp(Decimal::ZERO, dec!(100));
    Ok(ContributionRatio {
        bank_percent,
        customer_percent: dec!(100) - bank_percent,
    })
}
