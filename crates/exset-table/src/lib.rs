//! Binary columnar table format for example sets.
//!
//! Tables are stored in a small hierarchical container (see [`container`])
//! with one attributed array entry per column. [`TableCodec`] maps example
//! sets onto that layout and back; [`write_table_file`] and
//! [`read_table_file`] handle `.rmhdf5table` files on disk.
//!
//! # Example
//!
//! ```
//! use exset_model::{Annotation, Column, Dataset, ExampleSet, SemanticType};
//! use exset_table::TableCodec;
//!
//! let set = ExampleSet::new(
//!     Dataset::with_columns(vec![Column::utf8("churn", [Some("yes"), None])]).unwrap(),
//! )
//! .with_annotation("churn", Annotation::new(SemanticType::Binominal, "label"));
//!
//! let codec = TableCodec::new();
//! let mut bytes = Vec::new();
//! codec.write(&set, &mut bytes).unwrap();
//! let back = codec.read(&bytes[..]).unwrap();
//! assert_eq!(back.data, set.data);
//! ```

mod codec;
pub mod container;
mod file;
mod layout;

pub use codec::dictionary::{DictionaryPlacement, MISSING_PLACEHOLDER};
pub use codec::wire::{MISSING_DATE_TIME, WireType};
pub use codec::{INVALID_CONTAINER, TableCodec, TableReaderOptions, TableWriterOptions};
pub use file::{
    TABLE_EXTENSION, read_table_file, resolve_read_path, resolve_write_path, write_table_file,
};
pub use layout::{ColumnLayout, DictionaryLayout, TableLayout};
