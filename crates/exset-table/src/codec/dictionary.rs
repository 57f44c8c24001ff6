//! Dictionary encoding of nominal columns.
//!
//! Rows are stored as 1-based codes into a sorted dictionary; code 0 means
//! missing. Slot 0 of the dictionary holds a placeholder that never equals
//! a real value.

use std::collections::BTreeMap;

use exset_model::{Column, ExchangeError, Result};

use crate::container::DataArray;

/// Placeholder stored in dictionary slot 0.
pub const MISSING_PLACEHOLDER: &str = "NULL";

/// Largest dictionary (placeholder included) kept inline on the column entry.
pub const INLINE_LIMIT: usize = 3;

/// Where a column's dictionary lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryPlacement {
    /// String list attribute on the column entry.
    Inline,
    /// Separate `d{i}` entry, linked by reference.
    Referenced,
}

impl DictionaryPlacement {
    pub fn for_len(len: usize) -> Self {
        if len <= INLINE_LIMIT {
            DictionaryPlacement::Inline
        } else {
            DictionaryPlacement::Referenced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DictionaryPlacement::Inline => "inline",
            DictionaryPlacement::Referenced => "referenced",
        }
    }
}

/// A dictionary-encoded column.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedNominal {
    /// Per-row codes in the narrowest integer width.
    pub codes: DataArray,
    /// Placeholder followed by the sorted distinct values.
    pub dictionary: Vec<String>,
}

impl EncodedNominal {
    /// Number of real (non-placeholder) values.
    pub fn distinct(&self) -> usize {
        self.dictionary.len().saturating_sub(1)
    }

    pub fn placement(&self) -> DictionaryPlacement {
        DictionaryPlacement::for_len(self.dictionary.len())
    }
}

/// Placeholder that does not collide with any of `values`.
pub fn placeholder<'a>(values: impl IntoIterator<Item = &'a String> + Clone) -> String {
    let mut candidate = MISSING_PLACEHOLDER.to_string();
    while values.clone().into_iter().any(|value| *value == candidate) {
        candidate.insert(0, '\0');
    }
    candidate
}

/// Dictionary-encode a column using the string form of its values.
pub fn encode(column: &Column) -> EncodedNominal {
    let distinct = column.distinct_display_values();
    let mut dictionary = Vec::with_capacity(distinct.len() + 1);
    dictionary.push(placeholder(&distinct));
    dictionary.extend(distinct.iter().cloned());

    let lookup: BTreeMap<&str, i64> = distinct
        .iter()
        .zip(1..)
        .map(|(value, code)| (value.as_str(), code))
        .collect();
    let codes = (0..column.len())
        .map(|row| {
            column
                .values
                .display_value(row)
                // distinct holds every display value, so the lookup succeeds
                .and_then(|value| lookup.get(value.as_str()).copied())
                .unwrap_or(0)
        })
        .collect();

    EncodedNominal {
        codes: DataArray::narrowest_int(codes),
        dictionary,
    }
}

/// Decode codes against a dictionary whose slot 0 is the placeholder.
pub fn decode(column: &str, codes: &[i64], dictionary: &[String]) -> Result<Vec<Option<String>>> {
    codes
        .iter()
        .map(|&code| match code {
            0 => Ok(None),
            code => usize::try_from(code)
                .ok()
                .filter(|&index| index > 0)
                .and_then(|index| dictionary.get(index))
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    ExchangeError::format_in(
                        column,
                        format!(
                            "code {code} is outside the dictionary of {} values",
                            dictionary.len().saturating_sub(1)
                        ),
                    )
                }),
        })
        .collect()
}
