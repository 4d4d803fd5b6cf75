pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

const RANKING_HEADERS: [&str; 7] = [
    "rank",
    "city",
    "tpp_index",
    "true_purchasing_power",
    "adjusted_cost_index",
    "cost_of_living",
    "overall_value",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// One row per ranked city when `value` is a batch result, else `None`.
pub fn ranking_rows(value: &Value) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let rankings = value.get("result")?.get("rankings")?.as_array()?;
    let rows = rankings
        .iter()
        .map(|city| {
            let result = &city["result"];
            vec![
                scalar(&city["rank"]),
                scalar(&city["name"]),
                scalar(&result["true_purchasing_power_index"]),
                scalar(&result["true_purchasing_power"]),
                scalar(&result["adjusted_cost_index"]),
                scalar(&result["ratings"]["cost_of_living"]),
                scalar(&result["ratings"]["overall_value"]),
            ]
        })
        .collect();
    Some((RANKING_HEADERS.iter().map(|h| h.to_string()).collect(), rows))
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
