//! Example set data model.
//!
//! This crate provides the in-memory representation shared by the example
//! set codecs:
//!
//! - [`Dataset`]: ordered, uniquely named, equally long typed columns
//! - [`SemanticType`] and [`Role`]: the platform's column type system
//! - [`Annotation`] / [`ColumnMetadata`]: requested and validated per-column metadata
//! - [`TypeInference`]: resolves metadata from annotations and runtime types
//! - [`ExchangeError`]: the error taxonomy used by every codec
//!
//! # Example
//!
//! ```
//! use exset_model::{Annotation, Column, Dataset, ExampleSet, SemanticType};
//!
//! let data = Dataset::with_columns(vec![
//!     Column::int64("id", [Some(1), Some(2)]),
//!     Column::utf8("churn", [Some("yes"), Some("no")]),
//! ])
//! .unwrap();
//!
//! let set = ExampleSet::new(data)
//!     .with_annotation("churn", Annotation::new(SemanticType::Binominal, "label"));
//! assert_eq!(set.data.num_rows(), 2);
//! ```

mod dataset;
mod error;
#[cfg(feature = "polars")]
mod frame;
mod inference;
mod metadata;
mod names;
pub mod timestamp;
mod types;
mod version;

pub use dataset::{Column, ColumnValues, Dataset, ValueKind, format_float};
pub use error::{ExchangeError, Result};
pub use inference::{TypeInference, TypePolicy, fallback_type, narrow_nominal};
pub use metadata::{
    Annotation, ColumnMetadata, ExampleSet, MetadataMap, MetadataWarning, parse_annotations,
};
pub use names::{ColumnRenames, SANITIZED_PREFIX, is_invalid_name, sanitize_names};
pub use types::{ContainerRole, Role, SemanticType, UnknownSemanticType};
pub use version::{FormatVersion, LIBRARY_VERSION, VersionParseError};
