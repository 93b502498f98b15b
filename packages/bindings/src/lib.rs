use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use fincalc_core::pro_rata::DemandSchedule;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct EmiRequest {
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_months: u32,
}

#[napi]
pub fn emi(input_json: String) -> NapiResult<String> {
    let input: EmiRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::amortization::quote_installment(
        input.principal,
        input.annual_rate_percent,
        input.tenure_months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::amortization::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn part_payment_impact(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::amortization::compare_part_payments(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_contribution(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::growth::InvestmentPlan =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::growth::simulate_contribution(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_withdrawal(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::growth::WithdrawalPlan =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::growth::simulate_withdrawal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Retirement and eligibility
// ---------------------------------------------------------------------------

#[napi]
pub fn project_retirement(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::retirement::RetirementInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::retirement::project_retirement(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn estimate_eligibility(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::eligibility::EligibilityProfile =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::eligibility::estimate_eligibility(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pro-rata
// ---------------------------------------------------------------------------

#[napi]
pub fn allocate_demands(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::pro_rata::ProRataInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::pro_rata::allocate_demands(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct OverrideRequest {
    schedule: DemandSchedule,
    index: usize,
    customer_contribution: Decimal,
}

/// Takes a schedule previously returned in `allocate_demands().result` and
/// returns the edited schedule.
#[napi]
pub fn override_customer_contribution(input_json: String) -> NapiResult<String> {
    let input: OverrideRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = fincalc_core::pro_rata::override_customer_contribution(
        &input.schedule,
        input.index,
        input.customer_contribution,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}
