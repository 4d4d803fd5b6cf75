use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use purchasing_power_core::tax::{calculate_income_tax, national_reference_tax};
use purchasing_power_core::{with_metadata, RateProvider, RateTables};

/// Arguments for an income tax estimate
#[derive(Args)]
pub struct TaxArgs {
    /// Gross annual income
    #[arg(long)]
    pub income: Decimal,

    /// State name or USPS code; omitted means the national reference rate
    #[arg(long)]
    pub state: Option<String>,
}

pub fn run_tax(args: TaxArgs, rates: &RateTables) -> Result<Value, Box<dyn std::error::Error>> {
    if args.income.is_sign_negative() {
        return Err("--income must not be negative".into());
    }
    let start = Instant::now();

    let tax = match args.state.as_deref() {
        Some(state) => calculate_income_tax(args.income, Some(state), rates),
        None => national_reference_tax(args.income, rates),
    };

    let mut warnings = Vec::new();
    if let Some(state) = args.state.as_deref() {
        if !tax.jurisdiction_matched {
            warnings.push(format!(
                "Unknown jurisdiction {:?}; average state rate applied",
                state
            ));
        }
    }

    let mut result = serde_json::to_value(&tax)?;
    if let Value::Object(ref mut map) = result {
        map.insert("total_tax".into(), serde_json::to_value(tax.total_tax())?);
        map.insert(
            "after_tax_income".into(),
            serde_json::to_value(tax.gross_income - tax.total_tax())?,
        );
    }

    let output = with_metadata(
        "Effective-rate federal tax plus progressivity-scaled state tax",
        &serde_json::json!({
            "standard_deduction": rates.standard_deduction().to_string(),
            "tax_year": rates.tax_year(),
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        rates.tax_year(),
        result,
    );
    Ok(serde_json::to_value(output)?)
}
