//! Container error types.

use thiserror::Error;

/// Errors raised while reading or writing a container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The data does not start with the container signature.
    #[error("missing container signature")]
    BadSignature,

    /// The container was written by a newer format revision.
    #[error("unsupported format revision {found} (newest supported is {supported})")]
    UnsupportedRevision { found: u16, supported: u16 },

    /// The data ends in the middle of a structure.
    #[error("unexpected end of data at offset {offset}")]
    Truncated { offset: usize },

    /// A type tag is outside the known set.
    #[error("unknown {what} tag {tag} at offset {offset}")]
    UnknownTag {
        what: &'static str,
        tag: u8,
        offset: usize,
    },

    /// A string is not valid UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Groups are nested deeper than the reader allows.
    #[error("groups nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    /// Bytes remain after the root group.
    #[error("{count} trailing bytes after the root group")]
    TrailingBytes { count: usize },

    /// A reference attribute points at no node.
    #[error("attribute '{attribute}' references missing node '{path}'")]
    DanglingReference { attribute: String, path: String },

    /// A length does not fit the on-disk representation.
    #[error("{what} length {len} exceeds the format limit")]
    TooLarge { what: &'static str, len: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

impl ContainerError {
    /// Create a Truncated error.
    pub fn truncated(offset: usize) -> Self {
        Self::Truncated { offset }
    }

    /// Create an UnknownTag error.
    pub fn unknown_tag(what: &'static str, tag: u8, offset: usize) -> Self {
        Self::UnknownTag { what, tag, offset }
    }
}
