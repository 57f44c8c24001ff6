//! Column name sanitization.
//!
//! The platform rejects empty column names and names made only of digits.
//! Such names are mapped to a synthesized name (`att` + original) while the
//! original name is remembered so the metadata side channel can carry it.

use std::collections::{BTreeMap, BTreeSet};

/// Prefix of synthesized column names.
pub const SANITIZED_PREFIX: &str = "att";

/// Whether the platform would reject this column name.
///
/// Digits are any Unicode numeric characters, so `"٣"` is rejected as well.
pub fn is_invalid_name(name: &str) -> bool {
    name.is_empty() || name.chars().all(char::is_numeric)
}

/// Result of sanitizing a list of column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnRenames {
    /// Safe name per column position.
    pub safe_names: Vec<String>,
    /// Synthesized name -> original name, only for renamed columns.
    pub originals: BTreeMap<String, String>,
}

impl ColumnRenames {
    /// Original name of a safe name (identity for columns that kept their name).
    pub fn original_name<'a>(&'a self, safe_name: &'a str) -> &'a str {
        self.originals
            .get(safe_name)
            .map(String::as_str)
            .unwrap_or(safe_name)
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

/// Rename invalid column names, keeping valid ones untouched.
pub fn sanitize_names<'a>(names: impl IntoIterator<Item = &'a str>) -> ColumnRenames {
    let names: Vec<&str> = names.into_iter().collect();
    let mut taken: BTreeSet<String> = names.iter().map(|name| name.to_string()).collect();
    let mut renames = ColumnRenames::default();

    for name in names {
        if !is_invalid_name(name) {
            renames.safe_names.push(name.to_string());
            continue;
        }
        let base = format!("{SANITIZED_PREFIX}{name}");
        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while taken.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        tracing::debug!(original = name, renamed = %candidate, "renamed invalid column name");
        renames
            .originals
            .insert(candidate.clone(), name.to_string());
        renames.safe_names.push(candidate);
    }

    renames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_names() {
        assert!(is_invalid_name(""));
        assert!(is_invalid_name("123"));
        assert!(!is_invalid_name("a1"));
        assert!(!is_invalid_name("1.5"));
    }

    #[test]
    fn test_non_ascii_digits_are_invalid() {
        assert!(is_invalid_name("٣"));
        assert!(is_invalid_name("١٢"));
        assert!(!is_invalid_name("٣a"));
        assert_eq!(sanitize_names(["٣"]).safe_names, vec!["att٣"]);
    }

    #[test]
    fn test_sanitize_renames_numeric_and_empty() {
        let renames = sanitize_names(["123", "name", ""]);
        assert_eq!(renames.safe_names, vec!["att123", "name", "att"]);
        assert_eq!(renames.original_name("att123"), "123");
        assert_eq!(renames.original_name("att"), "");
        assert_eq!(renames.original_name("name"), "name");
    }

    #[test]
    fn test_sanitize_avoids_collisions() {
        let renames = sanitize_names(["1", "att1"]);
        assert_eq!(renames.safe_names, vec!["att1_1", "att1"]);
        assert_eq!(renames.original_name("att1_1"), "1");
    }

    #[test]
    fn test_sanitize_noop() {
        let renames = sanitize_names(["a", "b"]);
        assert!(renames.is_empty());
        assert_eq!(renames.safe_names, vec!["a", "b"]);
    }
}
