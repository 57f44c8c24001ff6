//! CSV fields to column values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use exset_model::timestamp::NANOS_PER_MICRO;
use exset_model::{Column, ColumnValues, ExchangeError, Result, SemanticType, ValueKind};

use crate::encode::NULL_TOKEN;

/// Runtime kind a semantic type decodes to.
pub fn decoded_kind(semantic_type: SemanticType) -> ValueKind {
    if semantic_type.is_nominal_family() {
        ValueKind::String
    } else if semantic_type.is_date_family() {
        ValueKind::Timestamp
    } else if semantic_type == SemanticType::Integer {
        ValueKind::Integer
    } else {
        ValueKind::Float
    }
}

/// Accumulates the values of one column while the CSV is streamed.
#[derive(Debug)]
pub struct ColumnBuilder {
    name: String,
    values: ColumnValues,
}

impl ColumnBuilder {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::empty(decoded_kind(semantic_type)),
        }
    }

    pub fn push(&mut self, field: &str) -> Result<()> {
        match &mut self.values {
            ColumnValues::Utf8(values) => {
                let value = decode_nominal(&self.name, field)?;
                values.push(value);
            }
            ColumnValues::Int64(values) => {
                let value = decode_integer(&self.name, field)?;
                values.push(value);
            }
            ColumnValues::Float64(values) => {
                let value = decode_real(&self.name, field)?;
                values.push(value);
            }
            ColumnValues::Timestamp(values) => {
                let value = decode_date(&self.name, field)?;
                values.push(value);
            }
            ColumnValues::Boolean(_) => {
                return Err(ExchangeError::format_in(
                    self.name.as_str(),
                    "boolean columns have no text wire representation",
                ));
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Column {
        Column::new(self.name, self.values)
    }
}

fn is_missing_number(field: &str) -> bool {
    matches!(field.trim(), "" | "nan" | "NaN" | "NAN" | "NaT")
}

fn decode_nominal(column: &str, field: &str) -> Result<Option<String>> {
    if field == NULL_TOKEN {
        return Ok(None);
    }
    let bytes = STANDARD.decode(field.trim()).map_err(|err| {
        ExchangeError::value_conversion(column, Some(field.to_string()), format!("invalid base64: {err}"))
    })?;
    String::from_utf8(bytes).map(Some).map_err(|err| {
        ExchangeError::value_conversion(column, Some(field.to_string()), format!("invalid UTF-8: {err}"))
    })
}

fn decode_integer(column: &str, field: &str) -> Result<Option<i64>> {
    if is_missing_number(field) {
        return Ok(None);
    }
    let field = field.trim();
    if let Ok(value) = field.parse::<i64>() {
        return Ok(Some(value));
    }
    match field.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(Some(value as i64))
        }
        _ => Err(ExchangeError::value_conversion(
            column,
            Some(field.to_string()),
            "not an integer",
        )),
    }
}

fn decode_real(column: &str, field: &str) -> Result<Option<f64>> {
    if is_missing_number(field) {
        return Ok(None);
    }
    field
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ExchangeError::value_conversion(column, Some(field.to_string()), "not a number"))
}

/// Epoch microseconds on the wire to epoch nanoseconds.
fn decode_date(column: &str, field: &str) -> Result<Option<i64>> {
    if field == NULL_TOKEN || is_missing_number(field) {
        return Ok(None);
    }
    let trimmed = field.trim();
    let micros = trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
                .map(|value| value as i64)
        })
        .ok_or_else(|| {
            ExchangeError::date_conversion(column, Some(field.to_string()), "not an epoch offset")
        })?;
    micros.checked_mul(NANOS_PER_MICRO).map(Some).ok_or_else(|| {
        ExchangeError::date_conversion(
            column,
            Some(field.to_string()),
            "date outside the representable range 1677-09-21 to 2262-04-11",
        )
    })
}
