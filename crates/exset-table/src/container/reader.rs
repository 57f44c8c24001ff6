//! Container reader.

use std::io::{BufReader, Read};

use super::error::{ContainerError, Result};
use super::types::{ArrayNode, AttrValue, Attributes, DataArray, Group, Node, Reference};
use super::{FORMAT_REVISION, MAX_DEPTH, SIGNATURE, array_tag, attr_tag, node_tag};

/// A parsed container.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// Format revision the container was written with.
    pub revision: u16,
    pub root: Group,
}

/// Reads a container from a byte stream.
pub struct ContainerReader<R: Read> {
    reader: BufReader<R>,
    verify_references: bool,
}

impl<R: Read> ContainerReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            verify_references: true,
        }
    }

    /// Enable or disable the check that every reference attribute resolves.
    #[must_use]
    pub fn verify_references(mut self, enabled: bool) -> Self {
        self.verify_references = enabled;
        self
    }

    /// Read the entire stream into memory and parse it.
    pub fn read(mut self) -> Result<Container> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        let container = parse_container(&data)?;
        if self.verify_references {
            for (attribute, reference) in container.root.references() {
                if container.root.resolve(reference).is_none() {
                    return Err(ContainerError::DanglingReference {
                        attribute: attribute.to_string(),
                        path: reference.path().to_string(),
                    });
                }
            }
        }
        Ok(container)
    }
}

/// Parse a container from bytes.
pub fn parse_container(data: &[u8]) -> Result<Container> {
    let mut decoder = Decoder { data, pos: 0 };
    let signature = decoder.take(SIGNATURE.len()).map_err(|_| ContainerError::BadSignature)?;
    if signature != SIGNATURE {
        return Err(ContainerError::BadSignature);
    }
    let revision = decoder.u16()?;
    if revision == 0 || revision > FORMAT_REVISION {
        return Err(ContainerError::UnsupportedRevision {
            found: revision,
            supported: FORMAT_REVISION,
        });
    }
    let root = decoder.group(0)?;
    let trailing = data.len() - decoder.pos;
    if trailing > 0 {
        return Err(ContainerError::TrailingBytes { count: trailing });
    }
    Ok(Container { revision, root })
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ContainerError::truncated(self.pos));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Read an element count and check the data can hold that many elements.
    fn count(&mut self, min_element_size: usize, wide: bool) -> Result<usize> {
        let offset = self.pos;
        let raw = if wide {
            u64::from_le_bytes(self.array()?)
        } else {
            u64::from(self.u32()?)
        };
        let count = usize::try_from(raw).map_err(|_| ContainerError::truncated(offset))?;
        match count.checked_mul(min_element_size) {
            Some(bytes) if bytes <= self.remaining() => Ok(count),
            _ => Err(ContainerError::truncated(offset)),
        }
    }

    fn string(&mut self) -> Result<String> {
        let len = self.count(1, false)?;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ContainerError::InvalidUtf8 { offset })
    }

    fn group(&mut self, depth: usize) -> Result<Group> {
        if depth > MAX_DEPTH {
            return Err(ContainerError::TooDeep { limit: MAX_DEPTH });
        }
        let mut group = Group::new();
        group.attrs = self.attributes()?;
        let children = self.count(5, false)?;
        for _ in 0..children {
            let name = self.string()?;
            let offset = self.pos;
            let node = match self.u8()? {
                node_tag::GROUP => Node::Group(self.group(depth + 1)?),
                node_tag::ARRAY => Node::Array(self.array_node()?),
                tag => return Err(ContainerError::unknown_tag("node", tag, offset)),
            };
            group.insert(name, node);
        }
        Ok(group)
    }

    fn array_node(&mut self) -> Result<ArrayNode> {
        let attrs = self.attributes()?;
        let offset = self.pos;
        let tag = self.u8()?;
        let data = match tag {
            array_tag::INT8 => {
                let len = self.count(1, true)?;
                DataArray::Int8(self.take(len)?.iter().map(|&b| b as i8).collect())
            }
            array_tag::INT16 => DataArray::Int16(self.numbers(i16::from_le_bytes)?),
            array_tag::INT32 => DataArray::Int32(self.numbers(i32::from_le_bytes)?),
            array_tag::INT64 => DataArray::Int64(self.numbers(i64::from_le_bytes)?),
            array_tag::FLOAT64 => DataArray::Float64(self.numbers(f64::from_le_bytes)?),
            array_tag::UTF8 => {
                let len = self.count(4, true)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.string()?);
                }
                DataArray::Utf8(values)
            }
            tag => return Err(ContainerError::unknown_tag("array", tag, offset)),
        };
        Ok(ArrayNode { data, attrs })
    }

    fn numbers<T, const N: usize>(&mut self, decode: fn([u8; N]) -> T) -> Result<Vec<T>> {
        let len = self.count(N, true)?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(decode(self.array()?));
        }
        Ok(values)
    }

    fn attributes(&mut self) -> Result<Attributes> {
        let count = self.count(6, false)?;
        let mut attrs = Attributes::new();
        for _ in 0..count {
            let name = self.string()?;
            let value = self.attr_value()?;
            attrs.set(name, value);
        }
        Ok(attrs)
    }

    fn attr_value(&mut self) -> Result<AttrValue> {
        let offset = self.pos;
        let value = match self.u8()? {
            attr_tag::INT8 => AttrValue::Int8(self.u8()? as i8),
            attr_tag::INT32 => AttrValue::Int32(i32::from_le_bytes(self.array()?)),
            attr_tag::INT64 => AttrValue::Int64(i64::from_le_bytes(self.array()?)),
            attr_tag::FLOAT64 => AttrValue::Float64(f64::from_le_bytes(self.array()?)),
            attr_tag::STR => AttrValue::Str(self.string()?),
            attr_tag::STR_LIST => {
                let len = self.count(4, false)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.string()?);
                }
                AttrValue::StrList(values)
            }
            attr_tag::REF => AttrValue::Ref(Reference::to(self.string()?)),
            tag => return Err(ContainerError::unknown_tag("attribute", tag, offset)),
        };
        Ok(value)
    }
}
