//! In-memory tabular dataset.
//!
//! A [`Dataset`] is an ordered list of uniquely named, equally long
//! [`Column`]s. Each column holds nullable values of one runtime type.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{ExchangeError, Result};
use crate::timestamp::{format_nanos, parse_nanos};

/// Runtime value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    String,
    Timestamp,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "int64",
            ValueKind::Float => "float64",
            ValueKind::Boolean => "bool",
            ValueKind::String => "string",
            ValueKind::Timestamp => "timestamp[ns]",
        };
        f.write_str(name)
    }
}

/// Column values. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    Utf8(Vec<Option<String>>),
    /// Naive epoch nanoseconds.
    Timestamp(Vec<Option<i64>>),
}

impl ColumnValues {
    /// Empty values of the given kind.
    pub fn empty(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Integer => ColumnValues::Int64(Vec::new()),
            ValueKind::Float => ColumnValues::Float64(Vec::new()),
            ValueKind::Boolean => ColumnValues::Boolean(Vec::new()),
            ValueKind::String => ColumnValues::Utf8(Vec::new()),
            ValueKind::Timestamp => ColumnValues::Timestamp(Vec::new()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ColumnValues::Int64(_) => ValueKind::Integer,
            ColumnValues::Float64(_) => ValueKind::Float,
            ColumnValues::Boolean(_) => ValueKind::Boolean,
            ColumnValues::Utf8(_) => ValueKind::String,
            ColumnValues::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int64(v) | ColumnValues::Timestamp(v) => v.len(),
            ColumnValues::Float64(v) => v.len(),
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the value at `row` is missing. NaN counts as missing.
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            ColumnValues::Int64(v) | ColumnValues::Timestamp(v) => {
                v.get(row).is_none_or(Option::is_none)
            }
            ColumnValues::Float64(v) => v
                .get(row)
                .is_none_or(|value| value.is_none_or(f64::is_nan)),
            ColumnValues::Boolean(v) => v.get(row).is_none_or(Option::is_none),
            ColumnValues::Utf8(v) => v.get(row).is_none_or(Option::is_none),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_null(row)).count()
    }

    /// String form of the value at `row`, `None` when missing.
    ///
    /// Floats with an integral value keep a trailing `.0`, booleans render
    /// as `True`/`False` and timestamps as `YYYY-MM-DD HH:MM:SS[.fraction]`.
    pub fn display_value(&self, row: usize) -> Option<String> {
        match self {
            ColumnValues::Int64(v) => v.get(row).copied().flatten().map(|n| n.to_string()),
            ColumnValues::Float64(v) => v
                .get(row)
                .copied()
                .flatten()
                .filter(|n| !n.is_nan())
                .map(format_float),
            ColumnValues::Boolean(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(|b| if b { "True" } else { "False" }.to_string()),
            ColumnValues::Utf8(v) => v.get(row).cloned().flatten(),
            ColumnValues::Timestamp(v) => v.get(row).copied().flatten().map(format_nanos),
        }
    }
}

/// Render a float the way the platform expects to see it in nominal columns.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Create an empty column of the given kind.
    pub fn empty(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::new(name, ColumnValues::empty(kind))
    }

    pub fn int64(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        Self::new(name, ColumnValues::Int64(values.into_iter().collect()))
    }

    pub fn float64(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(name, ColumnValues::Float64(values.into_iter().collect()))
    }

    pub fn boolean(name: impl Into<String>, values: impl IntoIterator<Item = Option<bool>>) -> Self {
        Self::new(name, ColumnValues::Boolean(values.into_iter().collect()))
    }

    pub fn utf8<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        Self::new(
            name,
            ColumnValues::Utf8(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    /// Create a timestamp column from epoch nanoseconds.
    pub fn timestamp(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<i64>>,
    ) -> Self {
        Self::new(name, ColumnValues::Timestamp(values.into_iter().collect()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn kind(&self) -> ValueKind {
        self.values.kind()
    }

    pub fn has_nulls(&self) -> bool {
        (0..self.len()).any(|row| self.values.is_null(row))
    }

    /// Distinct non-missing values in their string form, sorted.
    pub fn distinct_display_values(&self) -> BTreeSet<String> {
        (0..self.len())
            .filter_map(|row| self.values.display_value(row))
            .collect()
    }

    /// Epoch nanoseconds of a row, for columns written as dates.
    ///
    /// Timestamps and integers are taken as nanoseconds, integral floats are
    /// truncated, strings are parsed as integers or `YYYY-MM-DD[ HH:MM:SS]`.
    pub fn epoch_nanos(&self, row: usize) -> Result<Option<i64>> {
        let invalid = |value: String| {
            ExchangeError::date_conversion(self.name.as_str(), Some(value), "not a valid date")
        };
        match &self.values {
            ColumnValues::Timestamp(values) | ColumnValues::Int64(values) => {
                Ok(values.get(row).copied().flatten())
            }
            ColumnValues::Float64(values) => match values.get(row).copied().flatten() {
                None => Ok(None),
                Some(value) if value.is_nan() => Ok(None),
                Some(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                    Ok(Some(value as i64))
                }
                Some(value) => Err(invalid(value.to_string())),
            },
            ColumnValues::Utf8(values) => match values.get(row).and_then(Option::as_deref) {
                None => Ok(None),
                Some(text) => text
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .or_else(|| parse_nanos(text))
                    .map(Some)
                    .ok_or_else(|| invalid(text.to_string())),
            },
            ColumnValues::Boolean(values) => match values.get(row).copied().flatten() {
                None => Ok(None),
                Some(value) => Err(invalid(value.to_string())),
            },
        }
    }
}

/// Rectangular table of uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset, checking name uniqueness and equal column lengths.
    pub fn with_columns(columns: Vec<Column>) -> Result<Self> {
        let mut dataset = Self::new();
        for column in columns {
            dataset.push_column(column)?;
        }
        Ok(dataset)
    }

    /// Append a column.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.column(&column.name).is_some() {
            return Err(ExchangeError::format_in(
                column.name,
                "duplicate column name",
            ));
        }
        if let Some(first) = self.columns.first()
            && first.len() != column.len()
        {
            return Err(ExchangeError::format_in(
                column.name.clone(),
                format!(
                    "column has {} rows but the dataset has {}",
                    column.len(),
                    first.len()
                ),
            ));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}
