use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use purchasing_power_core::{RateProvider, RateTables};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Built-in tables, or caller-supplied JSON tables validated before use.
fn load_rates(rates_json: Option<String>) -> NapiResult<RateTables> {
    match rates_json {
        Some(json) => RateTables::from_json_str(&json).map_err(to_napi_error),
        None => Ok(RateTables::default()),
    }
}

// ---------------------------------------------------------------------------
// Purchasing power
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_city(input_json: String, rates_json: Option<String>) -> NapiResult<String> {
    let rates = load_rates(rates_json)?;
    let input: purchasing_power_core::CityAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = purchasing_power_core::analyze_city(&input, &rates).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_cities(input_json: String, rates_json: Option<String>) -> NapiResult<String> {
    let rates = load_rates(rates_json)?;
    let input: purchasing_power_core::batch::BatchInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        purchasing_power_core::batch::analyze_cities(&input, &rates).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_cities(input_json: String, rates_json: Option<String>) -> NapiResult<String> {
    let rates = load_rates(rates_json)?;
    let input: purchasing_power_core::compare::ComparisonInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        purchasing_power_core::compare::compare_cities(&input, &rates).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IncomeTaxRequest {
    gross_income: Decimal,
    #[serde(default)]
    jurisdiction: Option<String>,
}

#[napi]
pub fn calculate_income_tax(input_json: String, rates_json: Option<String>) -> NapiResult<String> {
    let rates = load_rates(rates_json)?;
    let input: IncomeTaxRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    if input.gross_income.is_sign_negative() {
        return Err(to_napi_error("gross_income must not be negative"));
    }
    let output = purchasing_power_core::tax::calculate_income_tax(
        input.gross_income,
        input.jurisdiction.as_deref(),
        &rates,
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_summary(input_json: String) -> NapiResult<String> {
    let input: purchasing_power_core::mortgage::MortgageInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        purchasing_power_core::mortgage::amortization_summary(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rate tables
// ---------------------------------------------------------------------------

#[napi]
pub fn default_rate_tables() -> NapiResult<String> {
    serde_json::to_string(&RateTables::default()).map_err(to_napi_error)
}

/// Validate JSON tables; resolves to the tax year they cover.
#[napi]
pub fn validate_rate_tables(rates_json: String) -> NapiResult<i32> {
    let rates = RateTables::from_json_str(&rates_json).map_err(to_napi_error)?;
    Ok(rates.tax_year())
}
