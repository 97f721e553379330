use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use loan_calc_core::rates::RateTable;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Rate table from an optional JSON config, defaulting to published rates.
fn rate_table(rates_json: Option<String>) -> NapiResult<RateTable> {
    match rates_json {
        Some(json) => RateTable::from_json_str(&json).map_err(to_napi_error),
        None => Ok(RateTable::default()),
    }
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_quote(input_json: String, rates_json: Option<String>) -> NapiResult<String> {
    let input: loan_calc_core::quote::LoanQuoteInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rates = rate_table(rates_json)?;
    let output =
        loan_calc_core::quote::calculate_loan_quote(&input, &rates).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: loan_calc_core::quote::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_calc_core::quote::calculate_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rates and display helpers
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_rates(rates_json: Option<String>) -> NapiResult<String> {
    let rates = rate_table(rates_json)?;
    serde_json::to_string(&rates).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct GroupInput {
    value: Decimal,
    #[serde(default)]
    places: u32,
}

/// Round half up and group thousands the way the calculator page shows
/// amounts (`50.000`, `1.471,53`).
#[napi]
pub fn display_amount(input_json: String) -> NapiResult<String> {
    let input: GroupInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rounded = loan_calc_core::format::round_half_up(input.value, input.places);
    Ok(loan_calc_core::format::group_thousands(rounded, '.', ','))
}
