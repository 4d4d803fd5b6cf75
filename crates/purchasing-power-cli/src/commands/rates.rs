use clap::Args;
use serde_json::Value;

use purchasing_power_core::{RateProvider, RateTables};

/// Arguments for inspecting rate tables
#[derive(Args)]
pub struct RatesArgs {
    /// Show a single state by name or USPS code
    #[arg(long)]
    pub state: Option<String>,

    /// Validate the tables and print a summary instead of the full tables
    #[arg(long)]
    pub check: bool,
}

pub fn run_rates(args: RatesArgs, rates: &RateTables) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(ref state) = args.state {
        let row = rates
            .state_rate(state)
            .ok_or_else(|| format!("Unknown jurisdiction: {}", state))?;
        return Ok(serde_json::to_value(row)?);
    }

    if args.check {
        rates.validate()?;
        return Ok(serde_json::json!({
            "valid": true,
            "tax_year": rates.tax_year,
            "effective_date": rates.effective_date,
            "federal_brackets": rates.federal_brackets.len(),
            "jurisdictions": rates.states.len(),
        }));
    }

    Ok(serde_json::to_value(rates)?)
}
