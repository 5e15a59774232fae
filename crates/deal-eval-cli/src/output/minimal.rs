use serde_json::Value;

/// Print just the key answer from the output.
///
/// Comparisons print one `label: A vs B` line per headline row. Otherwise
/// the first non-null field from the priority list wins, falling back to
/// the first field in the result object.
pub fn print_minimal(value: &Value) {
    for line in minimal_lines(value) {
        println!("{}", line);
    }
}

fn minimal_lines(value: &Value) -> Vec<String> {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "irr_total_pct",
        "irr_pct",
        "IRR (Total incl. Sale) (%)",
        "roi_pct",
        "cap_rate_pct",
        "npv",
    ];

    if let Value::Object(map) = result_obj {
        if let Some(Value::Array(rows)) = map.get("rows") {
            return rows
                .iter()
                .filter_map(|row| {
                    let label = row.get("label")?.as_str()?;
                    let summary = row.get("summary")?.as_str()?;
                    Some(format!("{}: {}", label, summary))
                })
                .collect();
        }

        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return vec![format_minimal(val)];
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return vec![format!("{}: {}", key, format_minimal(val))];
        }
    }

    vec![format_minimal(result_obj)]
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
