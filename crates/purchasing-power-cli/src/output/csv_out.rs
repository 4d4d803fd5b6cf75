use serde_json::Value;
use std::io;

use super::ranking_rows;

/// Write output as CSV to stdout: one row per city for batch rankings,
/// otherwise `field,value` pairs with dotted names for nested fields.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some((headers, rows)) = ranking_rows(value) {
        let _ = wtr.write_record(&headers);
        for row in rows {
            let _ = wtr.write_record(&row);
        }
        let _ = wtr.flush();
        return;
    }

    match value {
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            match map.get("result") {
                Some(Value::Object(result)) => write_fields(&mut wtr, "", result),
                _ => write_fields(&mut wtr, "", map),
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    prefix: &str,
    map: &serde_json::Map<String, Value>,
) {
    for (key, val) in map {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => write_fields(wtr, &field, inner),
            _ => {
                let _ = wtr.write_record([field.as_str(), &format_csv_value(val)]);
            }
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
