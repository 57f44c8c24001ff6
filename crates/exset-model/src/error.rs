//! Error types shared by the example set codecs.
//!
//! Every variant names the offending column (and the raw value when one is
//! known) so a failure can be traced back to the source data without
//! re-inspecting the file.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while encoding or decoding an example set.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Malformed or unrecognized structure (unknown type or role, column count mismatch).
    #[error("format error{}: {message}", in_column(.column))]
    Format {
        column: Option<String>,
        message: String,
    },

    /// A value cannot be cast to the declared or inferred type of its column.
    #[error("cannot convert value{} in column '{column}': {reason}", quoted(.value))]
    ValueConversion {
        column: String,
        value: Option<String>,
        reason: String,
    },

    /// Timestamp arithmetic overflow or a non-date value in a date column.
    #[error("date conversion failed{} in column '{column}': {reason}", quoted(.value))]
    DateConversion {
        column: String,
        value: Option<String>,
        reason: String,
    },

    /// A binominal column holds more than two distinct values.
    #[error(
        "column '{column}' is marked as binominal but has {distinct} distinct values (at most 2 allowed)"
    )]
    TooManyValues { column: String, distinct: usize },

    /// Underlying container or filesystem failure.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error on a caller supplied stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars conversion error.
    #[cfg(feature = "polars")]
    #[error("dataframe conversion failed: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

/// Result type alias for example set operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;

fn in_column(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|name| format!(" in column '{name}'"))
        .unwrap_or_default()
}

fn quoted(value: &Option<String>) -> String {
    value
        .as_ref()
        .map(|value| format!(" '{value}'"))
        .unwrap_or_default()
}

impl ExchangeError {
    /// Create a Format error that is not tied to a column.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            column: None,
            message: message.into(),
        }
    }

    /// Create a Format error for a column.
    pub fn format_in(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            column: Some(column.into()),
            message: message.into(),
        }
    }

    /// Create a ValueConversion error.
    pub fn value_conversion(
        column: impl Into<String>,
        value: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueConversion {
            column: column.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a DateConversion error.
    pub fn date_conversion(
        column: impl Into<String>,
        value: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DateConversion {
            column: column.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a TooManyValues error.
    pub fn too_many_values(column: impl Into<String>, distinct: usize) -> Self {
        Self::TooManyValues {
            column: column.into(),
            distinct,
        }
    }

    /// Create a Storage error without an underlying cause.
    pub fn storage(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Storage {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a Storage error wrapping an underlying cause.
    pub fn storage_with_source<E>(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            path,
            source: Some(Box::new(source)),
        }
    }

    /// Column named by this error, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Format { column, .. } => column.as_deref(),
            Self::ValueConversion { column, .. }
            | Self::DateConversion { column, .. }
            | Self::TooManyValues { column, .. } => Some(column),
            _ => None,
        }
    }
}
