pub mod amortization;
pub mod eligibility;
pub mod growth;
pub mod pro_rata;
pub mod retirement;
