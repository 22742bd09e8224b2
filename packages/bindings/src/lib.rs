use napi::Result as NapiResult;
use napi_derive::napi;

use microlend_core::loans::statement::StatementInput;
use microlend_core::loans::{self, StandingInput};
use microlend_core::terms::calculator::{self, LoanTermsInput, PenaltyInput};
use microlend_core::terms::schedule::{self, ScheduleInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loan terms
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_terms(input_json: String) -> NapiResult<String> {
    let input: LoanTermsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculator::calculate_loan_terms(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_penalty(input_json: String) -> NapiResult<String> {
    let input: PenaltyInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculator::assess_penalty(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn installment_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_installment_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan book
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_statement(input_json: String) -> NapiResult<String> {
    let input: StatementInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loans::statement_from_input(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn borrower_standing(input_json: String) -> NapiResult<String> {
    let input: StandingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loans::borrower_standing(&input.loans, &input.borrower);
    serde_json::to_string(&output).map_err(to_napi_error)
}
