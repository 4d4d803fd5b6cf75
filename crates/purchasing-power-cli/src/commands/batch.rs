use clap::Args;
use serde_json::Value;

use purchasing_power_core::batch::{analyze_cities, BatchInput};
use purchasing_power_core::RateTables;

use super::PersonaArgs;
use crate::input;

/// Arguments for ranking many cities
#[derive(Args)]
pub struct BatchArgs {
    /// Path to JSON input file with `cities` and an optional `persona`
    #[arg(long)]
    pub input: Option<String>,

    /// Keep only the N best-ranked cities in the output
    #[arg(long)]
    pub top: Option<usize>,

    #[command(flatten)]
    pub persona: PersonaArgs,
}

pub fn run_batch(args: BatchArgs, rates: &RateTables) -> Result<Value, Box<dyn std::error::Error>> {
    let batch: BatchInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input file (or JSON on stdin) is required for batch ranking".into());
    };

    let batch = BatchInput {
        persona: args.persona.apply(batch.persona),
        cities: batch.cities,
    };

    let mut output = analyze_cities(&batch, rates)?;
    if let Some(n) = args.top {
        output.result.rankings.truncate(n);
    }
    Ok(serde_json::to_value(output)?)
}
