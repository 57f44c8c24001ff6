//! Example set codec for the binary table format.
//!
//! Each column becomes an array entry `a{i}` carrying its name, a wire type
//! tag and its role. Nominal columns are dictionary encoded, date-time
//! columns are split into whole seconds and a nanosecond remainder entry.

pub mod dictionary;
mod read;
pub mod wire;
mod write;

use std::io::{Read, Write};

use exset_model::{ExampleSet, ExchangeError, Result, TypeInference};

use crate::container::{
    ContainerError, ContainerReader, ContainerWriter, FORMAT_REVISION, Group,
};

/// Message of every error raised while parsing a container.
pub const INVALID_CONTAINER: &str = "not a valid container file format";

/// Options applied when writing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWriterOptions {
    /// Container format revision to stamp.
    pub format_revision: u16,
}

impl Default for TableWriterOptions {
    fn default() -> Self {
        Self {
            format_revision: FORMAT_REVISION,
        }
    }
}

impl TableWriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format_revision(mut self, revision: u16) -> Self {
        self.format_revision = revision;
        self
    }
}

/// Options applied when reading tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableReaderOptions {
    /// Reject containers whose reference attributes point at missing entries.
    pub verify_references: bool,
}

impl Default for TableReaderOptions {
    fn default() -> Self {
        Self {
            verify_references: true,
        }
    }
}

impl TableReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_verify_references(mut self, enabled: bool) -> Self {
        self.verify_references = enabled;
        self
    }
}

/// Reads and writes example sets in the binary table format.
///
/// Explicit semantic types must be valid; an unknown type is a format error.
#[derive(Debug, Clone)]
pub struct TableCodec {
    writer: TableWriterOptions,
    reader: TableReaderOptions,
    inference: TypeInference,
}

impl Default for TableCodec {
    fn default() -> Self {
        Self {
            writer: TableWriterOptions::default(),
            reader: TableReaderOptions::default(),
            inference: TypeInference::strict(),
        }
    }
}

impl TableCodec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_writer_options(mut self, options: TableWriterOptions) -> Self {
        self.writer = options;
        self
    }

    #[must_use]
    pub fn with_reader_options(mut self, options: TableReaderOptions) -> Self {
        self.reader = options;
        self
    }

    pub fn writer_options(&self) -> &TableWriterOptions {
        &self.writer
    }

    pub fn reader_options(&self) -> &TableReaderOptions {
        &self.reader
    }

    /// Build the container tree of an example set.
    pub fn encode(&self, set: &ExampleSet) -> Result<Group> {
        write::encode_set(set, &self.inference)
    }

    /// Rebuild an example set from a container tree.
    pub fn decode(&self, root: &Group) -> Result<ExampleSet> {
        read::decode_set(root)
    }

    /// Encode an example set and write it as a container.
    ///
    /// Nothing is written when encoding fails.
    pub fn write<W: Write>(&self, set: &ExampleSet, writer: W) -> Result<()> {
        let _span = tracing::info_span!(
            "table_write",
            columns = set.data.num_columns(),
            rows = set.data.num_rows()
        )
        .entered();
        let root = self.encode(set)?;
        ContainerWriter::with_revision(writer, self.writer.format_revision)
            .map_err(write_error)?
            .write(&root)
            .map_err(write_error)
    }

    /// Read a container and decode its example set.
    pub fn read<R: Read>(&self, reader: R) -> Result<ExampleSet> {
        let _span = tracing::info_span!("table_read").entered();
        let container = ContainerReader::new(reader)
            .verify_references(self.reader.verify_references)
            .read()
            .map_err(|err| ExchangeError::storage_with_source(INVALID_CONTAINER, None, err))?;
        let set = self.decode(&container.root)?;
        tracing::debug!(
            revision = container.revision,
            columns = set.data.num_columns(),
            rows = set.data.num_rows(),
            "decoded table"
        );
        Ok(set)
    }
}

fn write_error(err: ContainerError) -> ExchangeError {
    match err {
        ContainerError::Io(err) => ExchangeError::Io(err),
        other => ExchangeError::storage_with_source("cannot write container", None, other),
    }
}
