use colored::Colorize;
use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{result_of, row_grid, scalar_fields, schedule_rows};

/// Headline figures as a field/value table, then the schedule (if any) as
/// its own table, then warnings and methodology.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, cell) in scalar_fields(result) {
        builder.push_record([field, cell]);
    }
    println!("{}", Table::from(builder));

    if let Some((name, rows)) = schedule_rows(result) {
        let (headers, cells) = row_grid(rows);
        let mut builder = Builder::default();
        builder.push_record(headers);
        for row in cells {
            builder.push_record(row);
        }
        println!("\n{}:", name.bold());
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(methodology)) = value.get("methodology") {
        println!("\nMethodology: {methodology}");
    }
}
