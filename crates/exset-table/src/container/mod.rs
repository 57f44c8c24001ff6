//! Hierarchical binary container.
//!
//! A container is a tree of named groups and typed one-dimensional arrays,
//! each carrying an ordered bag of typed attributes. Attributes may reference
//! other nodes by absolute path.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! signature      8 bytes  "\x89RMHTBL\n"
//! revision       u16
//! root group
//!
//! group          attributes, u32 child count, children
//! child          string name, u8 node tag, group | array
//! array          attributes, u8 array tag, u64 length, items
//! attributes     u32 count, (string name, u8 attribute tag, payload)*
//! string         u32 byte length, UTF-8 bytes
//! ```

mod error;
mod reader;
mod types;
mod writer;

pub use error::{ContainerError, Result};
pub use reader::{Container, ContainerReader, parse_container};
pub use types::{ArrayNode, AttrValue, Attributes, DataArray, Group, Node, Reference};
pub use writer::{ContainerWriter, to_bytes};

/// File signature. The high first byte catches 7-bit transfers.
pub const SIGNATURE: [u8; 8] = *b"\x89RMHTBL\n";

/// Newest format revision this crate reads and writes.
pub const FORMAT_REVISION: u16 = 1;

/// Deepest group nesting accepted by the reader.
pub const MAX_DEPTH: usize = 64;

pub(crate) mod node_tag {
    pub const GROUP: u8 = 1;
    pub const ARRAY: u8 = 2;
}

pub(crate) mod attr_tag {
    pub const INT8: u8 = 1;
    pub const INT32: u8 = 2;
    pub const INT64: u8 = 3;
    pub const FLOAT64: u8 = 4;
    pub const STR: u8 = 5;
    pub const STR_LIST: u8 = 6;
    pub const REF: u8 = 7;
}

pub(crate) mod array_tag {
    pub const INT8: u8 = 1;
    pub const INT16: u8 = 2;
    pub const INT32: u8 = 3;
    pub const INT64: u8 = 4;
    pub const FLOAT64: u8 = 5;
    pub const UTF8: u8 = 6;
}
