use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::ranking_rows;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some((headers, rows)) = ranking_rows(value) {
        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in rows {
            builder.push_record(row);
        }
        println!("{}", Table::from(builder));
        if let Value::Object(map) = value {
            print_notes(map);
        }
        return;
    }

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_nested(result);
                print_notes(map);
            }
            _ => print_nested(map),
        },
        _ => println!("{}", value),
    }
}

/// Two-column table; nested objects become dotted field names.
fn print_nested(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    flatten_into(&mut builder, "", map);
    println!("{}", Table::from(builder));
}

fn flatten_into(builder: &mut Builder, prefix: &str, map: &serde_json::Map<String, Value>) {
    for (key, val) in map {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => flatten_into(builder, &field, inner),
            _ => builder.push_record([field, format_value(val)]),
        }
    }
}

fn print_notes(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
