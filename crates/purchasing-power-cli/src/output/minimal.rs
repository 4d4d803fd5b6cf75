use serde_json::Value;

/// Headline figure of each command, most specific first.
const PRIORITY_KEYS: [&str; 9] = [
    "true_purchasing_power_index",
    "purchasing_power_ratio",
    "equivalent_income",
    "true_purchasing_power",
    "best",
    "monthly_payment",
    "combined_effective_rate",
    "rate",
    "valid",
];

/// Print just the headline value, for shell pipelines.
///
/// Compare output puts `purchasing_power_ratio` ahead of the per-city
/// figures; a result with none of the known keys prints its first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result_obj else {
        println!("{}", format_minimal(result_obj));
        return;
    };

    let headline = PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null());
    match headline {
        Some(val) => println!("{}", format_minimal(val)),
        None => match map.iter().next() {
            Some((key, val)) => println!("{}: {}", key, format_minimal(val)),
            None => println!("null"),
        },
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
