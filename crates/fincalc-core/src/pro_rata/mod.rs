//! Splitting a construction-linked demand schedule between the financing
//! bank and the customer.

pub mod allocator;
pub mod cost;

pub use allocator::{
    allocate_demands, classify_demands, override_customer_contribution, DemandInput,
    DemandPosition, DemandSchedule, DemandScheduleRow, ProRataInput,
};
pub use cost::{contribution_ratio, ContributionRatio, CostSheet};
