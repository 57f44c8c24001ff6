//! Column values to CSV fields.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use exset_model::timestamp::{MICROS_PER_DAY, NANOS_PER_MICRO};
use exset_model::{Column, ColumnValues, Result, SemanticType};

/// Token written for a missing nominal value.
pub const NULL_TOKEN: &str = "null";

/// Encode every row of a column for the given semantic type.
pub fn encode_column(
    column: &Column,
    semantic_type: SemanticType,
    date_time_compat: bool,
) -> Result<Vec<String>> {
    if semantic_type.is_nominal_family() {
        return Ok(encode_nominal(column));
    }
    if semantic_type.is_date_family() {
        let compat = date_time_compat.then_some(semantic_type);
        return (0..column.len())
            .map(|row| -> Result<String> {
                Ok(column.epoch_nanos(row)?
                    .map(|nanos| wire_micros(nanos, compat).to_string())
                    .unwrap_or_default())
            })
            .collect();
    }
    Ok(encode_plain(column))
}

fn encode_nominal(column: &Column) -> Vec<String> {
    (0..column.len())
        .map(|row| match column.values.display_value(row) {
            Some(value) => STANDARD.encode(value.as_bytes()),
            None => NULL_TOKEN.to_string(),
        })
        .collect()
}

fn encode_plain(column: &Column) -> Vec<String> {
    match &column.values {
        ColumnValues::Timestamp(values) => values
            .iter()
            .map(|value| value.map(|nanos| nanos.to_string()).unwrap_or_default())
            .collect(),
        values => (0..values.len())
            .map(|row| values.display_value(row).unwrap_or_default())
            .collect(),
    }
}

/// Epoch microseconds, optionally truncated to table-format precision.
fn wire_micros(nanos: i64, compat: Option<SemanticType>) -> i64 {
    let micros = nanos.div_euclid(NANOS_PER_MICRO);
    match compat {
        Some(SemanticType::Time) => micros.rem_euclid(MICROS_PER_DAY),
        Some(SemanticType::Date) => micros.div_euclid(MICROS_PER_DAY) * MICROS_PER_DAY,
        _ => micros,
    }
}
