pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Array fields that carry a period-by-period schedule, in lookup order.
const ROW_FIELDS: [&str; 3] = ["entries", "rows", "year_by_year"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` inside a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First schedule-like array of objects in a result.
pub(crate) fn schedule_rows(result: &Value) -> Option<(&'static str, &[Value])> {
    let map = result.as_object()?;
    ROW_FIELDS.iter().find_map(|field| match map.get(*field) {
        Some(Value::Array(rows)) if rows.first().is_some_and(Value::is_object) => {
            Some((*field, rows.as_slice()))
        }
        _ => None,
    })
}

/// Scalar fields of a result. Nested objects are flattened one level as
/// `parent.child`; schedule arrays are left to [`schedule_rows`].
pub(crate) fn scalar_fields(result: &Value) -> Vec<(String, String)> {
    let Some(map) = result.as_object() else {
        return vec![(String::from("value"), display_value(result))];
    };

    let mut fields = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {}
            Value::Object(inner) => {
                for (child, v) in inner {
                    fields.push((format!("{key}.{child}"), display_value(v)));
                }
            }
            _ => fields.push((key.clone(), display_value(val))),
        }
    }
    fields
}

/// Render one JSON value as a cell.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Header and cells for a list of row objects, keyed by the first row.
pub(crate) fn row_grid(rows: &[Value]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers: Vec<String> = rows
        .first()
        .and_then(Value::as_object)
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();

    let cells = rows
        .iter()
        .filter_map(Value::as_object)
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(display_value).unwrap_or_default())
                .collect()
        })
        .collect();
    (headers, cells)
}
