//! CSV + JSON metadata wire format for example sets.
//!
//! An example set travels as two streams:
//!
//! - a headerless UTF-8 CSV with one column per dataset column, nominal
//!   values base64-encoded and date/time values as epoch microseconds
//! - a JSON metadata document holding the column names, semantic types
//!   and roles in column order
//!
//! # Example
//!
//! ```
//! use exset_model::{Annotation, Column, Dataset, ExampleSet, SemanticType};
//! use exset_text::TextCodec;
//!
//! let set = ExampleSet::new(
//!     Dataset::with_columns(vec![Column::utf8("churn", [Some("yes"), None])]).unwrap(),
//! )
//! .with_annotation("churn", Annotation::new(SemanticType::Binominal, "label"));
//!
//! let codec = TextCodec::default();
//! let (mut csv, mut pmd) = (Vec::new(), Vec::new());
//! codec.write(&set, &mut csv, &mut pmd).unwrap();
//! assert_eq!(csv, b"eWVz\nnull\n");
//!
//! let back = codec.read(&csv[..], &pmd[..]).unwrap();
//! assert_eq!(back.data, set.data);
//! ```

mod codec;
mod decode;
mod document;
mod encode;
mod options;

pub use codec::{TextCodec, WriteSummary};
pub use decode::decoded_kind;
pub use document::{MetadataDocument, MetadataEntry, PythonFormatter};
pub use encode::{NULL_TOKEN, encode_column};
pub use options::{DEFAULT_MODULE, DEFAULT_SOURCE, TextCodecOptions};
