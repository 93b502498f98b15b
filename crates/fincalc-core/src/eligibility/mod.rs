//! Loan eligibility: the largest principal whose installment fits within a
//! FOIR limit and the income left after existing obligations.

pub mod estimator;

pub use estimator::{
    estimate_eligibility, BindingConstraint, EligibilityEstimate, EligibilityProfile, MAX_FOIR,
    MIN_FOIR,
};
