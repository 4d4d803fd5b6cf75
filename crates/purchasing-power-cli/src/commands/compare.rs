use clap::Args;
use serde_json::Value;

use purchasing_power_core::compare::{compare_cities, ComparisonInput};
use purchasing_power_core::RateTables;

use super::PersonaArgs;
use crate::input;

/// Arguments for a two-city comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file with `origin`, `target` and an optional `persona`
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub persona: PersonaArgs,
}

pub fn run_compare(args: CompareArgs, rates: &RateTables) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison: ComparisonInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input file (or JSON on stdin) is required for comparison".into());
    };

    let comparison = ComparisonInput {
        persona: args.persona.apply(comparison.persona),
        ..comparison
    };

    let output = compare_cities(&comparison, rates)?;
    Ok(serde_json::to_value(output)?)
}
