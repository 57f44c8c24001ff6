//! Semantic types and column roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain-level column type understood by the analytics platform.
///
/// `Nominal` is a request-only supertype: the codecs narrow it to
/// `Binominal` or `Polynominal` before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Nominal,
    Binominal,
    Polynominal,
    Text,
    FilePath,
    Integer,
    Real,
    DateTime,
    Date,
    Time,
}

/// Raised when a type string is outside the closed set of semantic types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown semantic type '{0}'")]
pub struct UnknownSemanticType(pub String);

impl SemanticType {
    /// All semantic types, in the order the platform lists them.
    pub const ALL: [SemanticType; 10] = [
        SemanticType::Nominal,
        SemanticType::Binominal,
        SemanticType::Polynominal,
        SemanticType::Text,
        SemanticType::FilePath,
        SemanticType::Integer,
        SemanticType::Real,
        SemanticType::DateTime,
        SemanticType::Date,
        SemanticType::Time,
    ];

    /// Wire name used in metadata documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Nominal => "nominal",
            SemanticType::Binominal => "binominal",
            SemanticType::Polynominal => "polynominal",
            SemanticType::Text => "text",
            SemanticType::FilePath => "file_path",
            SemanticType::Integer => "integer",
            SemanticType::Real => "real",
            SemanticType::DateTime => "date_time",
            SemanticType::Date => "date",
            SemanticType::Time => "time",
        }
    }

    /// Categorical string types, stored dictionary-encoded or base64 on the wire.
    pub fn is_nominal_family(&self) -> bool {
        matches!(
            self,
            SemanticType::Nominal
                | SemanticType::Binominal
                | SemanticType::Polynominal
                | SemanticType::Text
                | SemanticType::FilePath
        )
    }

    /// Timestamp types, stored as epoch offsets.
    pub fn is_date_family(&self) -> bool {
        matches!(
            self,
            SemanticType::DateTime | SemanticType::Date | SemanticType::Time
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SemanticType::Integer | SemanticType::Real)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = UnknownSemanticType;

    /// Parse a type name case-insensitively. `numeric` is accepted as a
    /// legacy spelling of `real`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominal" => Ok(SemanticType::Nominal),
            "binominal" => Ok(SemanticType::Binominal),
            "polynominal" => Ok(SemanticType::Polynominal),
            "text" => Ok(SemanticType::Text),
            "file_path" => Ok(SemanticType::FilePath),
            "integer" => Ok(SemanticType::Integer),
            "real" | "numeric" => Ok(SemanticType::Real),
            "date_time" => Ok(SemanticType::DateTime),
            "date" => Ok(SemanticType::Date),
            "time" => Ok(SemanticType::Time),
            _ => Err(UnknownSemanticType(s.to_string())),
        }
    }
}

/// Functional purpose of a column (label, id, weight, ...).
///
/// Roles are free-form; `attribute` is the default and means "no special role".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Name of the default role.
    pub const ATTRIBUTE: &'static str = "attribute";

    /// Create a role, mapping an empty string to `attribute`.
    pub fn new(role: impl Into<String>) -> Self {
        let role = role.into();
        if role.trim().is_empty() {
            Self::attribute()
        } else {
            Self(role)
        }
    }

    pub fn attribute() -> Self {
        Self(Self::ATTRIBUTE.to_string())
    }

    /// Normalize an optional role string: missing or empty becomes `attribute`.
    pub fn from_optional(role: Option<&str>) -> Self {
        role.map(Self::new).unwrap_or_default()
    }

    pub fn is_attribute(&self) -> bool {
        self.0 == Self::ATTRIBUTE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::attribute()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Fixed role enum recognized by the binary table format.
///
/// Free-form roles are split into one of these plus an auxiliary
/// `legacy_role` string (see [`ContainerRole::split`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRole {
    Batch,
    Cluster,
    Id,
    Label,
    Outlier,
    Prediction,
    Weight,
    Score,
    Metadata,
}

impl ContainerRole {
    /// Roles that map one-to-one onto a column role name.
    pub const RECOGNIZED: [ContainerRole; 7] = [
        ContainerRole::Batch,
        ContainerRole::Cluster,
        ContainerRole::Id,
        ContainerRole::Label,
        ContainerRole::Outlier,
        ContainerRole::Prediction,
        ContainerRole::Weight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerRole::Batch => "BATCH",
            ContainerRole::Cluster => "CLUSTER",
            ContainerRole::Id => "ID",
            ContainerRole::Label => "LABEL",
            ContainerRole::Outlier => "OUTLIER",
            ContainerRole::Prediction => "PREDICTION",
            ContainerRole::Weight => "WEIGHT",
            ContainerRole::Score => "SCORE",
            ContainerRole::Metadata => "METADATA",
        }
    }

    /// Parse a stored role name. Names are matched exactly, in upper case.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "BATCH" => Some(ContainerRole::Batch),
            "CLUSTER" => Some(ContainerRole::Cluster),
            "ID" => Some(ContainerRole::Id),
            "LABEL" => Some(ContainerRole::Label),
            "OUTLIER" => Some(ContainerRole::Outlier),
            "PREDICTION" => Some(ContainerRole::Prediction),
            "WEIGHT" => Some(ContainerRole::Weight),
            "SCORE" => Some(ContainerRole::Score),
            "METADATA" => Some(ContainerRole::Metadata),
            _ => None,
        }
    }

    /// Split a free-form role into a stored role and an optional legacy tag.
    ///
    /// Returns `None` for the default `attribute` role, which is not stored.
    /// `confidence*` roles become `SCORE`, other unrecognized roles become
    /// `METADATA`; both keep the original string as the legacy tag.
    pub fn split(role: &Role) -> Option<(ContainerRole, Option<String>)> {
        if role.is_attribute() {
            return None;
        }
        let raw = role.as_str();
        if raw.starts_with("confidence") {
            return Some((ContainerRole::Score, Some(raw.to_string())));
        }
        match Self::parse(&raw.trim().to_ascii_uppercase()) {
            Some(parsed) if Self::RECOGNIZED.contains(&parsed) => Some((parsed, None)),
            _ => Some((ContainerRole::Metadata, Some(raw.to_string()))),
        }
    }

    /// Rebuild the free-form role from a stored role and its legacy tag.
    pub fn join(self, legacy_role: Option<&str>) -> Role {
        match self {
            ContainerRole::Score | ContainerRole::Metadata => match legacy_role {
                Some(legacy) if !legacy.is_empty() => Role::new(legacy),
                _ => Role::new(self.as_str().to_ascii_lowercase()),
            },
            _ => Role::new(self.as_str().to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_type_roundtrip_names() {
        for ty in SemanticType::ALL {
            assert_eq!(ty.as_str().parse::<SemanticType>(), Ok(ty));
        }
    }

    #[test]
    fn test_semantic_type_case_insensitive() {
        assert_eq!("DATE_TIME".parse(), Ok(SemanticType::DateTime));
        assert_eq!("Binominal".parse(), Ok(SemanticType::Binominal));
        assert_eq!("numeric".parse(), Ok(SemanticType::Real));
    }

    #[test]
    fn test_semantic_type_rejects_unknown() {
        let err = "imaginary".parse::<SemanticType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown semantic type 'imaginary'");
    }

    #[test]
    fn test_families() {
        assert!(SemanticType::FilePath.is_nominal_family());
        assert!(!SemanticType::Integer.is_nominal_family());
        assert!(SemanticType::Time.is_date_family());
        assert!(!SemanticType::Real.is_date_family());
    }

    #[test]
    fn test_role_defaults_to_attribute() {
        assert!(Role::new("").is_attribute());
        assert!(Role::from_optional(None).is_attribute());
        assert_eq!(Role::new("label").as_str(), "label");
    }

    #[test]
    fn test_container_role_split() {
        assert_eq!(ContainerRole::split(&Role::attribute()), None);
        assert_eq!(
            ContainerRole::split(&Role::new("Label")),
            Some((ContainerRole::Label, None))
        );
        assert_eq!(
            ContainerRole::split(&Role::new("confidence_yes")),
            Some((ContainerRole::Score, Some("confidence_yes".to_string())))
        );
        assert_eq!(
            ContainerRole::split(&Role::new("source_system")),
            Some((ContainerRole::Metadata, Some("source_system".to_string())))
        );
        // SCORE and METADATA are never taken verbatim from a free-form role.
        assert_eq!(
            ContainerRole::split(&Role::new("score")),
            Some((ContainerRole::Metadata, Some("score".to_string())))
        );
    }

    #[test]
    fn test_container_role_parse_is_exact() {
        assert_eq!(ContainerRole::parse("LABEL"), Some(ContainerRole::Label));
        assert_eq!(ContainerRole::parse("label"), None);
        assert_eq!(ContainerRole::parse(" ID"), None);
    }

    #[test]
    fn test_container_role_join() {
        assert_eq!(ContainerRole::Weight.join(None).as_str(), "weight");
        assert_eq!(
            ContainerRole::Score
                .join(Some("confidence_yes"))
                .as_str(),
            "confidence_yes"
        );
        assert_eq!(ContainerRole::Metadata.join(None).as_str(), "metadata");
    }
}
