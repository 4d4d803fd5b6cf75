use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use purchasing_power_core::mortgage::{amortization_summary, MortgageInput};
use purchasing_power_core::{with_metadata, RateProvider, RateTables};

use crate::input;

/// Arguments for a mortgage payment calculation
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the home
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Annual interest rate (defaults to the rate tables)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Down payment fraction (defaults to the rate tables)
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Loan term in months (defaults to the rate tables)
    #[arg(long)]
    pub term_months: Option<u32>,
}

pub fn run_mortgage(args: MortgageArgs, rates: &RateTables) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = rates.mortgage();
    let mortgage_input: MortgageInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        MortgageInput {
            home_price: args
                .home_price
                .ok_or("--home-price is required (or provide --input)")?,
            annual_rate: args.rate.unwrap_or(defaults.annual_rate),
            down_payment_fraction: args.down_payment.unwrap_or(defaults.down_payment_fraction),
            term_months: args.term_months.unwrap_or(defaults.term_months),
        }
    };

    let start = Instant::now();
    let summary = amortization_summary(&mortgage_input)?;
    let output = with_metadata(
        "Fixed-rate amortized mortgage",
        &mortgage_input,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        rates.tax_year(),
        summary,
    );
    Ok(serde_json::to_value(output)?)
}
