//! Container writer.

use std::io::{BufWriter, Write};

use super::error::{ContainerError, Result};
use super::types::{ArrayNode, AttrValue, Attributes, DataArray, Group, Node};
use super::{FORMAT_REVISION, SIGNATURE, array_tag, attr_tag, node_tag};

/// Writes a container to a byte stream.
pub struct ContainerWriter<W: Write> {
    writer: BufWriter<W>,
    revision: u16,
}

impl<W: Write> ContainerWriter<W> {
    /// Create a writer for the current format revision.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            revision: FORMAT_REVISION,
        }
    }

    /// Create a writer that stamps an explicit format revision.
    pub fn with_revision(writer: W, revision: u16) -> Result<Self> {
        if revision == 0 || revision > FORMAT_REVISION {
            return Err(ContainerError::UnsupportedRevision {
                found: revision,
                supported: FORMAT_REVISION,
            });
        }
        Ok(Self {
            writer: BufWriter::new(writer),
            revision,
        })
    }

    /// Write the signature, revision and root group, then flush.
    pub fn write(mut self, root: &Group) -> Result<()> {
        self.writer.write_all(&SIGNATURE)?;
        self.writer.write_all(&self.revision.to_le_bytes())?;
        self.write_group(root)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_group(&mut self, group: &Group) -> Result<()> {
        self.write_attrs(&group.attrs)?;
        self.write_len("group", group.len())?;
        for (name, node) in group.children() {
            self.write_str(name)?;
            match node {
                Node::Group(child) => {
                    self.write_u8(node_tag::GROUP)?;
                    self.write_group(child)?;
                }
                Node::Array(array) => {
                    self.write_u8(node_tag::ARRAY)?;
                    self.write_array_node(array)?;
                }
            }
        }
        Ok(())
    }

    fn write_array_node(&mut self, node: &ArrayNode) -> Result<()> {
        self.write_attrs(&node.attrs)?;
        let data = &node.data;
        let (tag, len) = match data {
            DataArray::Int8(values) => (array_tag::INT8, values.len()),
            DataArray::Int16(values) => (array_tag::INT16, values.len()),
            DataArray::Int32(values) => (array_tag::INT32, values.len()),
            DataArray::Int64(values) => (array_tag::INT64, values.len()),
            DataArray::Float64(values) => (array_tag::FLOAT64, values.len()),
            DataArray::Utf8(values) => (array_tag::UTF8, values.len()),
        };
        self.write_u8(tag)?;
        self.writer.write_all(&(len as u64).to_le_bytes())?;
        match data {
            DataArray::Int8(values) => {
                for value in values {
                    self.writer.write_all(&value.to_le_bytes())?;
                }
            }
            DataArray::Int16(values) => {
                for value in values {
                    self.writer.write_all(&value.to_le_bytes())?;
                }
            }
            DataArray::Int32(values) => {
                for value in values {
                    self.writer.write_all(&value.to_le_bytes())?;
                }
            }
            DataArray::Int64(values) => {
                for value in values {
                    self.writer.write_all(&value.to_le_bytes())?;
                }
            }
            DataArray::Float64(values) => {
                for value in values {
                    self.writer.write_all(&value.to_le_bytes())?;
                }
            }
            DataArray::Utf8(values) => {
                for value in values {
                    self.write_str(value)?;
                }
            }
        }
        Ok(())
    }

    fn write_attrs(&mut self, attrs: &Attributes) -> Result<()> {
        self.write_len("attribute", attrs.len())?;
        for (name, value) in attrs.iter() {
            self.write_str(name)?;
            self.write_attr(value)?;
        }
        Ok(())
    }

    fn write_attr(&mut self, value: &AttrValue) -> Result<()> {
        match value {
            AttrValue::Int8(value) => {
                self.write_u8(attr_tag::INT8)?;
                self.writer.write_all(&value.to_le_bytes())?;
            }
            AttrValue::Int32(value) => {
                self.write_u8(attr_tag::INT32)?;
                self.writer.write_all(&value.to_le_bytes())?;
            }
            AttrValue::Int64(value) => {
                self.write_u8(attr_tag::INT64)?;
                self.writer.write_all(&value.to_le_bytes())?;
            }
            AttrValue::Float64(value) => {
                self.write_u8(attr_tag::FLOAT64)?;
                self.writer.write_all(&value.to_le_bytes())?;
            }
            AttrValue::Str(value) => {
                self.write_u8(attr_tag::STR)?;
                self.write_str(value)?;
            }
            AttrValue::StrList(values) => {
                self.write_u8(attr_tag::STR_LIST)?;
                self.write_len("string list", values.len())?;
                for value in values {
                    self.write_str(value)?;
                }
            }
            AttrValue::Ref(reference) => {
                self.write_u8(attr_tag::REF)?;
                self.write_str(reference.path())?;
            }
        }
        Ok(())
    }

    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_all(&[value])?;
        Ok(())
    }

    fn write_len(&mut self, what: &'static str, len: usize) -> Result<()> {
        let len32 = u32::try_from(len).map_err(|_| ContainerError::TooLarge { what, len })?;
        self.writer.write_all(&len32.to_le_bytes())?;
        Ok(())
    }

    fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_len("string", value.len())?;
        self.writer.write_all(value.as_bytes())?;
        Ok(())
    }
}

/// Serialize a container into memory.
pub fn to_bytes(root: &Group) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    ContainerWriter::new(&mut buffer).write(root)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bytes() {
        let bytes = to_bytes(&Group::new()).unwrap();
        assert_eq!(&bytes[..8], &SIGNATURE);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), FORMAT_REVISION);
        // empty attribute bag + no children
        assert_eq!(&bytes[10..], &[0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_rejects_future_revision() {
        let result = ContainerWriter::with_revision(Vec::new(), FORMAT_REVISION + 1);
        assert!(matches!(
            result,
            Err(ContainerError::UnsupportedRevision { .. })
        ));
    }
}
