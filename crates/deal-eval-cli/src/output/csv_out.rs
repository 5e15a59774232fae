use serde_json::{Map, Value};
use std::io;

/// Array fields written as a row-per-item CSV in preference to field/value.
const TABULAR_FIELDS: [&str; 2] = ["schedule", "rows"];

/// Write output as CSV to stdout.
///
/// Projections print their yearly schedule and comparisons their headline
/// rows. Anything else falls back to two columns: field, value.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = map.get("result").and_then(Value::as_object).unwrap_or(map);
            match tabular_field(result) {
                Some(rows) => write_array_csv(&mut wtr, rows),
                None => write_field_value_csv(&mut wtr, result),
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn tabular_field(result: &Map<String, Value>) -> Option<&[Value]> {
    TABULAR_FIELDS
        .iter()
        .filter_map(|field| result.get(*field).and_then(Value::as_array))
        .find(|rows| !rows.is_empty())
        .map(Vec::as_slice)
}

fn write_field_value_csv<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
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
