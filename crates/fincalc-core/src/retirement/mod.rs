//! Retirement corpus projection built on the growth simulators.

pub mod corpus;
pub mod projector;

pub use corpus::{real_rate, required_corpus};
pub use projector::{
    project_retirement, AccumulationSummary, DecumulationSummary, RetirementInput,
    RetirementPhase, RetirementProjection, RetirementYear,
};
