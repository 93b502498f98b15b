use serde_json::Value;
use std::io;

use super::{result_of, row_grid, scalar_fields, schedule_rows};

/// Write the schedule as CSV when the result has one, otherwise the
/// headline figures as field/value pairs.
pub fn print_csv(value: &Value) {
    let result = result_of(value);
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match schedule_rows(result) {
        Some((_, rows)) => {
            let (headers, cells) = row_grid(rows);
            std::iter::once(headers)
                .chain(cells)
                .try_for_each(|record| wtr.write_record(&record))
        }
        None => std::iter::once((String::from("field"), String::from("value")))
            .chain(scalar_fields(result))
            .try_for_each(|(field, cell)| wtr.write_record([field, cell])),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        log::error!("failed to write CSV: {e}");
    }
}
