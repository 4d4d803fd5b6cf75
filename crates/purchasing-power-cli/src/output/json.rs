use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout. Decimals are already strings, so figures
/// keep their exact value through the pipe.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut out, value).map_err(io::Error::from) {
        eprintln!("JSON serialization error: {}", e);
        return;
    }
    let _ = writeln!(out);
}
