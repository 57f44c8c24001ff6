//! Names, type tags and constants of the table layout.

use std::fmt;

use exset_model::{ColumnValues, SemanticType};

/// Root attribute holding the row count.
pub const ROWS: &str = "rows";
/// Root attribute holding the column count.
pub const COLUMNS: &str = "columns";

pub const NAME: &str = "name";
pub const TYPE: &str = "type";
pub const ROLE: &str = "role";
pub const LEGACY_ROLE: &str = "legacy_role";
pub const LEGACY_TYPE: &str = "legacy_type";
pub const DICTIONARY: &str = "dictionary";
pub const POSITIVE_INDEX: &str = "positive_index";
pub const ADDITIONAL: &str = "additional";

/// Stored value of a missing date-time or time.
pub const MISSING_DATE_TIME: i64 = i64::MAX;

/// Entry name of column `index`.
pub fn column_entry(index: usize) -> String {
    format!("a{index}")
}

/// Entry name of the out-of-line dictionary of column `index`.
pub fn dictionary_entry(index: usize) -> String {
    format!("d{index}")
}

/// Entry name of the nanosecond remainder of date-time column `index`.
pub fn additional_entry(index: usize) -> String {
    format!("a{index}a")
}

/// Storage type tag of a column entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Nominal,
    Integer,
    Real,
    DateTime,
    /// Older files tag date columns separately; read like `Date-Time`.
    Date,
    Time,
}

impl WireType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::Nominal => "Nominal",
            WireType::Integer => "Integer",
            WireType::Real => "Real",
            WireType::DateTime => "Date-Time",
            WireType::Date => "Date",
            WireType::Time => "Time",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Nominal" => Some(WireType::Nominal),
            "Integer" => Some(WireType::Integer),
            "Real" => Some(WireType::Real),
            "Date-Time" => Some(WireType::DateTime),
            "Date" => Some(WireType::Date),
            "Time" => Some(WireType::Time),
            _ => None,
        }
    }

    /// Wire type written for a semantic type.
    pub fn for_semantic(semantic_type: SemanticType) -> Self {
        match semantic_type {
            SemanticType::Nominal
            | SemanticType::Binominal
            | SemanticType::Polynominal
            | SemanticType::Text
            | SemanticType::FilePath => WireType::Nominal,
            SemanticType::Integer => WireType::Integer,
            SemanticType::Real => WireType::Real,
            SemanticType::DateTime | SemanticType::Date => WireType::DateTime,
            SemanticType::Time => WireType::Time,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric type code of the platform's type enum.
pub fn type_code(semantic_type: SemanticType) -> i8 {
    match semantic_type {
        SemanticType::Nominal => 1,
        SemanticType::Integer => 3,
        SemanticType::Real => 4,
        SemanticType::Text => 5,
        SemanticType::Binominal => 6,
        SemanticType::Polynominal => 7,
        SemanticType::FilePath => 8,
        SemanticType::DateTime => 9,
        SemanticType::Date => 10,
        SemanticType::Time => 11,
    }
}

/// Semantic type of a stored type code.
pub fn type_from_code(code: i64) -> Option<SemanticType> {
    SemanticType::ALL
        .into_iter()
        .find(|semantic_type| i64::from(type_code(*semantic_type)) == code)
}

/// `legacy_type` code for types the wire type alone cannot express.
pub fn legacy_type_code(semantic_type: SemanticType) -> Option<i8> {
    match semantic_type {
        SemanticType::Text
        | SemanticType::Binominal
        | SemanticType::FilePath
        | SemanticType::Date => Some(type_code(semantic_type)),
        _ => None,
    }
}

/// Integer payload of an `Integer` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegerPayload {
    Exact(Vec<i64>),
    /// Missing values stored as NaN in a float array.
    Demoted(Vec<f64>),
}

/// Store integers with missing values as floats with NaN.
///
/// A 64-bit integer array has no missing marker, so a column with any
/// missing value is written as float64. Readers see a float array under the
/// `Integer` tag and load it as a real column.
pub fn integer_payload(values: &[Option<i64>]) -> IntegerPayload {
    if values.iter().all(Option::is_some) {
        IntegerPayload::Exact(values.iter().flatten().copied().collect())
    } else {
        IntegerPayload::Demoted(
            values
                .iter()
                .map(|value| value.map_or(f64::NAN, |v| v as f64))
                .collect(),
        )
    }
}

/// Values read from an `Integer` entry: exact when no NaN is present.
pub fn integer_values(values: Vec<f64>) -> ColumnValues {
    if values.iter().any(|value| value.is_nan()) {
        ColumnValues::Float64(values.into_iter().map(float_value).collect())
    } else {
        ColumnValues::Int64(values.into_iter().map(|value| Some(value as i64)).collect())
    }
}

/// Float read from storage; NaN is the missing marker.
pub fn float_value(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(type_code(SemanticType::Binominal), 6);
        assert_eq!(type_from_code(10), Some(SemanticType::Date));
        assert_eq!(type_from_code(2), None);
        assert_eq!(legacy_type_code(SemanticType::Polynominal), None);
        assert_eq!(legacy_type_code(SemanticType::FilePath), Some(8));
    }

    #[test]
    fn test_wire_types() {
        assert_eq!(WireType::for_semantic(SemanticType::Date), WireType::DateTime);
        assert_eq!(WireType::for_semantic(SemanticType::Text), WireType::Nominal);
        assert_eq!(WireType::parse("Date-Time"), Some(WireType::DateTime));
        assert_eq!(WireType::parse("date-time"), None);
    }

    #[test]
    fn test_integer_demotion() {
        assert_eq!(
            integer_payload(&[Some(1), Some(2)]),
            IntegerPayload::Exact(vec![1, 2])
        );
        let IntegerPayload::Demoted(values) = integer_payload(&[Some(1), None]) else {
            panic!("expected demotion");
        };
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
        assert_eq!(
            integer_values(vec![3.0, 4.0]),
            ColumnValues::Int64(vec![Some(3), Some(4)])
        );
        assert_eq!(
            integer_values(values),
            ColumnValues::Float64(vec![Some(1.0), None])
        );
    }
}
