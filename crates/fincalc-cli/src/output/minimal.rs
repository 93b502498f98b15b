use serde_json::Value;

use super::{result_of, scalar_fields};

/// Headline figure of each calculator, in priority order. Matched against
/// the flattened field name or its last segment.
const PRIORITY_FIELDS: [&str; 8] = [
    "installment",
    "interest_saved",
    "maturity_value",
    "final_value",
    "corpus_gap",
    "eligible_principal",
    "total_bank",
    "required_corpus",
];

/// Print just the headline number of a result.
pub fn print_minimal(value: &Value) {
    let fields = scalar_fields(result_of(value));

    for wanted in PRIORITY_FIELDS {
        let hit = fields.iter().find(|(field, cell)| {
            !cell.is_empty() && (field == wanted || field.ends_with(&format!(".{wanted}")))
        });
        if let Some((_, cell)) = hit {
            println!("{cell}");
            return;
        }
    }

    if let Some((field, cell)) = fields.first() {
        println!("{field}: {cell}");
    }
}
