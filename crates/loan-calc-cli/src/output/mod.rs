pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_envelope(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Schedule rows inside a result: the rounded payment plan of a quote,
/// or the raw rows of a schedule request.
pub(crate) fn schedule_rows(result: &Value) -> Option<&Vec<Value>> {
    result
        .pointer("/display/schedule")
        .or_else(|| result.get("rows"))
        .and_then(Value::as_array)
}

/// Flatten nested objects into dotted keys, skipping arrays.
pub(crate) fn flatten_scalars(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_scalars(&name, val, out);
            }
        }
        Value::Array(_) => {}
        other => out.push((prefix.to_string(), other.clone())),
    }
}
