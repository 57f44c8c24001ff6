//! Column metadata carried alongside a dataset.
//!
//! Callers attach an [`Annotation`] per column name in a [`MetadataMap`].
//! Annotations hold raw strings because they come from users and may be
//! wrong; [`crate::inference::TypeInference`] turns them into validated
//! [`ColumnMetadata`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::Dataset;
use crate::error::{ExchangeError, Result};
use crate::types::{Role, SemanticType};

/// Requested `(type, role)` for a column, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub semantic_type: Option<String>,
    pub role: Option<String>,
}

impl Annotation {
    pub fn new(semantic_type: SemanticType, role: impl Into<String>) -> Self {
        Self {
            semantic_type: Some(semantic_type.as_str().to_string()),
            role: Some(role.into()),
        }
    }

    /// Annotation fixing only the type.
    pub fn typed(semantic_type: SemanticType) -> Self {
        Self {
            semantic_type: Some(semantic_type.as_str().to_string()),
            role: None,
        }
    }

    /// Annotation fixing only the role.
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            semantic_type: None,
            role: Some(role.into()),
        }
    }

    /// Annotation from unvalidated strings.
    pub fn raw(semantic_type: Option<&str>, role: Option<&str>) -> Self {
        Self {
            semantic_type: semantic_type.map(str::to_string),
            role: role.map(str::to_string),
        }
    }
}

impl From<&ColumnMetadata> for Annotation {
    fn from(meta: &ColumnMetadata) -> Self {
        Self::new(meta.semantic_type, meta.role.as_str())
    }
}

/// Validated `(type, role)` of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub semantic_type: SemanticType,
    pub role: Role,
}

impl ColumnMetadata {
    pub fn new(semantic_type: SemanticType, role: Role) -> Self {
        Self {
            semantic_type,
            role,
        }
    }
}

/// Column name -> annotation.
pub type MetadataMap = BTreeMap<String, Annotation>;

/// A non-fatal metadata problem. Encoding proceeds with best-effort inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataWarning {
    pub column: Option<String>,
    pub message: String,
}

impl MetadataWarning {
    pub fn new(column: Option<&str>, message: impl Into<String>) -> Self {
        let warning = Self {
            column: column.map(str::to_string),
            message: message.into(),
        };
        tracing::warn!(column = ?warning.column, "{}", warning.message);
        warning
    }
}

/// Parse loosely structured annotations from JSON.
///
/// The well-formed shape is an object mapping column names to
/// `[type, role]` pairs. A bare string is taken as the type, a one-element
/// list as the type only; both produce a warning. Anything else is ignored
/// with a warning.
pub fn parse_annotations(value: &Value) -> Result<(MetadataMap, Vec<MetadataWarning>)> {
    let Value::Object(entries) = value else {
        return Err(ExchangeError::format(
            "annotations must be a JSON object mapping column names to [type, role]",
        ));
    };

    let mut map = MetadataMap::new();
    let mut warnings = Vec::new();
    for (column, entry) in entries {
        let annotation = match entry {
            Value::Array(items) if items.len() == 2 => Annotation::raw(
                json_str(&items[0]),
                json_str(&items[1]),
            ),
            Value::Array(items) if !items.is_empty() => {
                warnings.push(MetadataWarning::new(
                    Some(column),
                    format!(
                        "annotation must be a [type, role] pair, e.g. [\"binominal\", \"label\"]; using '{}' as type",
                        items[0]
                    ),
                ));
                Annotation::raw(json_str(&items[0]), items.get(1).and_then(json_str))
            }
            Value::String(ty) if !ty.is_empty() => {
                warnings.push(MetadataWarning::new(
                    Some(column),
                    "annotation must be a [type, role] pair; using the string as type",
                ));
                Annotation::raw(Some(ty), None)
            }
            Value::Null => continue,
            other => {
                warnings.push(MetadataWarning::new(
                    Some(column),
                    format!("ignoring malformed annotation {other}"),
                ));
                continue;
            }
        };
        map.insert(column.clone(), annotation);
    }
    Ok((map, warnings))
}

fn json_str(value: &Value) -> Option<&str> {
    value.as_str()
}

/// A dataset together with its per-column metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleSet {
    pub data: Dataset,
    pub metadata: MetadataMap,
}

impl ExampleSet {
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach an annotation to a column.
    pub fn with_annotation(mut self, column: impl Into<String>, annotation: Annotation) -> Self {
        self.metadata.insert(column.into(), annotation);
        self
    }

    pub fn annotation(&self, column: &str) -> Option<&Annotation> {
        self.metadata.get(column)
    }

    /// Validated metadata of a column, when its annotation is complete and valid.
    pub fn column_metadata(&self, column: &str) -> Option<ColumnMetadata> {
        let annotation = self.metadata.get(column)?;
        let semantic_type = annotation.semantic_type.as_deref()?.parse().ok()?;
        Some(ColumnMetadata::new(
            semantic_type,
            Role::from_optional(annotation.role.as_deref()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_well_formed_annotations() {
        let (map, warnings) =
            parse_annotations(&json!({"a": ["binominal", "label"], "b": ["real", null]})).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(map["a"], Annotation::raw(Some("binominal"), Some("label")));
        assert_eq!(map["b"], Annotation::raw(Some("real"), None));
    }

    #[test]
    fn test_parse_malformed_annotations_warn() {
        let (map, warnings) = parse_annotations(&json!({
            "a": "integer",
            "b": ["text"],
            "c": 42,
        }))
        .unwrap();
        assert_eq!(warnings.len(), 3);
        assert_eq!(map["a"], Annotation::raw(Some("integer"), None));
        assert_eq!(map["b"], Annotation::raw(Some("text"), None));
        assert!(!map.contains_key("c"));
        assert_eq!(warnings[2].column.as_deref(), Some("c"));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_annotations(&json!(["a"])).is_err());
    }

    #[test]
    fn test_column_metadata() {
        let set = ExampleSet::default()
            .with_annotation("a", Annotation::new(SemanticType::Integer, "id"))
            .with_annotation("b", Annotation::raw(Some("imaginary"), None));
        assert_eq!(
            set.column_metadata("a"),
            Some(ColumnMetadata::new(SemanticType::Integer, Role::new("id")))
        );
        assert_eq!(set.column_metadata("b"), None);
        assert_eq!(set.column_metadata("missing"), None);
    }
}
