//! Semantic type and role inference.
//!
//! Resolves the `(semantic type, role)` of a column from an optional caller
//! annotation and the column's runtime value type.

use crate::dataset::{Column, ValueKind};
use crate::error::{ExchangeError, Result};
use crate::metadata::{Annotation, ColumnMetadata, MetadataWarning};
use crate::types::{Role, SemanticType};

/// How to treat an explicit type string outside the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypePolicy {
    /// Warn and fall back to runtime-type inference.
    #[default]
    Lenient,
    /// Fail with a format error.
    Strict,
}

/// Semantic type used when no valid explicit type is supplied.
pub fn fallback_type(kind: ValueKind) -> SemanticType {
    match kind {
        ValueKind::Integer => SemanticType::Integer,
        ValueKind::Float => SemanticType::Real,
        ValueKind::Timestamp => SemanticType::DateTime,
        ValueKind::Boolean => SemanticType::Binominal,
        ValueKind::String => SemanticType::Polynominal,
    }
}

/// Narrow the `nominal` supertype by the number of distinct values.
pub fn narrow_nominal(column: &Column) -> SemanticType {
    if column.distinct_display_values().len() <= 2 {
        SemanticType::Binominal
    } else {
        SemanticType::Polynominal
    }
}

/// Type inference with a fixed policy for invalid explicit types.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeInference {
    policy: TypePolicy,
}

impl TypeInference {
    pub fn new(policy: TypePolicy) -> Self {
        Self { policy }
    }

    pub fn lenient() -> Self {
        Self::new(TypePolicy::Lenient)
    }

    pub fn strict() -> Self {
        Self::new(TypePolicy::Strict)
    }

    pub fn policy(&self) -> TypePolicy {
        self.policy
    }

    /// Resolve `(type, role)` from a runtime kind and optional annotation.
    ///
    /// `nominal` is returned as requested; use [`TypeInference::resolve`]
    /// to also narrow it against column data.
    pub fn infer(
        &self,
        column_name: &str,
        kind: ValueKind,
        annotation: Option<&Annotation>,
        warnings: &mut Vec<MetadataWarning>,
    ) -> Result<ColumnMetadata> {
        let explicit = annotation.and_then(|a| a.semantic_type.as_deref());
        let semantic_type = match explicit {
            Some(raw) => match raw.parse::<SemanticType>() {
                Ok(parsed) => parsed,
                Err(err) => match self.policy {
                    TypePolicy::Strict => {
                        return Err(ExchangeError::format_in(column_name, err.to_string()));
                    }
                    TypePolicy::Lenient => {
                        let fallback = fallback_type(kind);
                        warnings.push(MetadataWarning::new(
                            Some(column_name),
                            format!("{err}; inferred '{fallback}' from {kind} values"),
                        ));
                        fallback
                    }
                },
            },
            None => fallback_type(kind),
        };
        let role = Role::from_optional(annotation.and_then(|a| a.role.as_deref()));
        Ok(ColumnMetadata::new(semantic_type, role))
    }

    /// Resolve the metadata of a column, narrowing `nominal` by its data.
    pub fn resolve(
        &self,
        column: &Column,
        annotation: Option<&Annotation>,
        warnings: &mut Vec<MetadataWarning>,
    ) -> Result<ColumnMetadata> {
        let mut meta = self.infer(&column.name, column.kind(), annotation, warnings)?;
        if meta.semantic_type == SemanticType::Nominal {
            meta.semantic_type = narrow_nominal(column);
            tracing::debug!(
                column = %column.name,
                narrowed = %meta.semantic_type,
                "narrowed nominal column"
            );
        }
        Ok(meta)
    }
}
