//! Equated-installment loans: installment formula, reducing-balance
//! schedules, and part-payment recomputation.

pub mod installment;
pub mod part_payment;
pub mod schedule;

pub use installment::{
    compute_installment, level_installment, monthly_rate, quote_installment, InstallmentQuote,
    MAX_TENURE_MONTHS,
};
pub use part_payment::{compare_part_payments, PartPaymentImpact};
pub use schedule::{
    build_schedule, generate_schedule, yearly_breakdown, AmortizationEntry, AmortizationInput,
    AmortizationSchedule, LoanTerms, PartPayment, PrepaymentStrategy, ScheduleSummary,
    YearlyAmortization,
};
