//! Container node, array and attribute types.

use std::collections::HashMap;
use std::fmt;

/// Absolute path to a node, e.g. `/d3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference(String);

impl Reference {
    /// Reference a node by absolute path. A missing leading `/` is added.
    pub fn to(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.starts_with('/') {
            Self(path)
        } else {
            Self(format!("/{path}"))
        }
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    /// Path segments from the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int8(i8),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Str(String),
    StrList(Vec<String>),
    Ref(Reference),
}

impl AttrValue {
    /// Integer value widened to i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int8(value) => Some(i64::from(*value)),
            AttrValue::Int32(value) => Some(i64::from(*value)),
            AttrValue::Int64(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Int8(_) => "int8",
            AttrValue::Int32(_) => "int32",
            AttrValue::Int64(_) => "int64",
            AttrValue::Float64(_) => "float64",
            AttrValue::Str(_) => "string",
            AttrValue::StrList(_) => "string[]",
            AttrValue::Ref(_) => "reference",
        }
    }
}

impl From<i8> for AttrValue {
    fn from(value: i8) -> Self {
        AttrValue::Int8(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int32(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int64(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float64(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::StrList(value)
    }
}

impl From<Reference> for AttrValue {
    fn from(value: Reference) -> Self {
        AttrValue::Ref(value)
    }
}

/// Ordered attribute bag. Setting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_int)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Homogeneous one-dimensional array payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DataArray {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
}

impl DataArray {
    /// Store integers in the narrowest signed width that holds all of them.
    pub fn narrowest_int(values: Vec<i64>) -> Self {
        let (min, max) = values
            .iter()
            .fold((0i64, 0i64), |(lo, hi), &value| (lo.min(value), hi.max(value)));
        let fits = |low: i64, high: i64| min >= low && max <= high;
        if fits(i8::MIN.into(), i8::MAX.into()) {
            DataArray::Int8(values.into_iter().map(|v| v as i8).collect())
        } else if fits(i16::MIN.into(), i16::MAX.into()) {
            DataArray::Int16(values.into_iter().map(|v| v as i16).collect())
        } else if fits(i32::MIN.into(), i32::MAX.into()) {
            DataArray::Int32(values.into_iter().map(|v| v as i32).collect())
        } else {
            DataArray::Int64(values)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DataArray::Int8(values) => values.len(),
            DataArray::Int16(values) => values.len(),
            DataArray::Int32(values) => values.len(),
            DataArray::Int64(values) => values.len(),
            DataArray::Float64(values) => values.len(),
            DataArray::Utf8(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataArray::Int8(_) => "int8",
            DataArray::Int16(_) => "int16",
            DataArray::Int32(_) => "int32",
            DataArray::Int64(_) => "int64",
            DataArray::Float64(_) => "float64",
            DataArray::Utf8(_) => "string",
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataArray::Int8(_) | DataArray::Int16(_) | DataArray::Int32(_) | DataArray::Int64(_)
        )
    }

    /// Integer payload widened to i64; `None` for float and string arrays.
    pub fn to_i64(&self) -> Option<Vec<i64>> {
        match self {
            DataArray::Int8(values) => Some(values.iter().map(|&v| i64::from(v)).collect()),
            DataArray::Int16(values) => Some(values.iter().map(|&v| i64::from(v)).collect()),
            DataArray::Int32(values) => Some(values.iter().map(|&v| i64::from(v)).collect()),
            DataArray::Int64(values) => Some(values.clone()),
            DataArray::Float64(_) | DataArray::Utf8(_) => None,
        }
    }

    /// Numeric payload as f64; `None` for string arrays.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            DataArray::Float64(values) => Some(values.clone()),
            DataArray::Utf8(_) => None,
            ints => ints
                .to_i64()
                .map(|values| values.into_iter().map(|v| v as f64).collect()),
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            DataArray::Utf8(values) => Some(values),
            _ => None,
        }
    }
}

/// A leaf node: an array with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub data: DataArray,
    pub attrs: Attributes,
}

impl ArrayNode {
    pub fn new(data: DataArray) -> Self {
        Self {
            data,
            attrs: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(name, value);
        self
    }
}

/// A container node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Group(Group),
    Array(ArrayNode),
}

impl Node {
    pub fn attrs(&self) -> &Attributes {
        match self {
            Node::Group(group) => &group.attrs,
            Node::Array(array) => &array.attrs,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Node::Array(array) => Some(array),
            Node::Group(_) => None,
        }
    }
}

/// A group of named child nodes with its own attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub attrs: Attributes,
    children: Vec<(String, Node)>,
    /// Child name -> position in `children`.
    index: HashMap<String, usize>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a child, replacing any child with the same name.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&position) => self.children[position].1 = node,
            None => {
                self.index.insert(name.clone(), self.children.len());
                self.children.push((name, node));
            }
        }
    }

    pub fn insert_array(&mut self, name: impl Into<String>, array: ArrayNode) {
        self.insert(name, Node::Array(array));
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        let &position = self.index.get(name)?;
        self.children.get(position).map(|(_, node)| node)
    }

    pub fn array(&self, name: &str) -> Option<&ArrayNode> {
        self.child(name).and_then(Node::as_array)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Follow an absolute reference from this group.
    pub fn resolve(&self, reference: &Reference) -> Option<&Node> {
        let mut segments = reference.segments();
        let mut node = self.child(segments.next()?)?;
        for segment in segments {
            match node {
                Node::Group(group) => node = group.child(segment)?,
                Node::Array(_) => return None,
            }
        }
        Some(node)
    }

    /// Every reference attribute below this group, with the attribute name.
    pub fn references(&self) -> Vec<(&str, &Reference)> {
        let mut found = Vec::new();
        collect_references(self, &mut found);
        found
    }
}

fn collect_references<'a>(group: &'a Group, found: &mut Vec<(&'a str, &'a Reference)>) {
    let refs = |attrs: &'a Attributes| {
        attrs.iter().filter_map(|(name, value)| match value {
            AttrValue::Ref(reference) => Some((name, reference)),
            _ => None,
        })
    };
    found.extend(refs(&group.attrs));
    for (_, node) in group.children() {
        match node {
            Node::Group(child) => collect_references(child, found),
            Node::Array(array) => found.extend(refs(&array.attrs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrowest_int() {
        assert!(matches!(DataArray::narrowest_int(vec![0, 127]), DataArray::Int8(_)));
        assert!(matches!(DataArray::narrowest_int(vec![0, 128]), DataArray::Int16(_)));
        assert!(matches!(DataArray::narrowest_int(vec![-40_000]), DataArray::Int32(_)));
        assert!(matches!(DataArray::narrowest_int(vec![i64::MAX]), DataArray::Int64(_)));
        assert!(matches!(DataArray::narrowest_int(Vec::new()), DataArray::Int8(_)));
    }

    #[test]
    fn test_attributes_replace() {
        let mut attrs = Attributes::new();
        attrs.set("type", "Nominal");
        attrs.set("type", "Integer");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get_str("type"), Some("Integer"));
        attrs.set("rows", 3i32);
        assert_eq!(attrs.get_int("rows"), Some(3));
    }

    #[test]
    fn test_group_keeps_order_and_replaces_by_name() {
        let mut group = Group::new();
        for index in 0..2_000 {
            group.insert_array(format!("a{index}"), ArrayNode::new(DataArray::Int8(vec![])));
        }
        group.insert_array("a7", ArrayNode::new(DataArray::Int8(vec![7])));
        assert_eq!(group.len(), 2_000);
        assert_eq!(group.array("a7").unwrap().data, DataArray::Int8(vec![7]));
        assert_eq!(group.array("a1999").unwrap().data, DataArray::Int8(vec![]));
        assert!(group.child("a2000").is_none());
        let names: Vec<&str> = group.children().map(|(name, _)| name).take(3).collect();
        assert_eq!(names, vec!["a0", "a1", "a2"]);
    }

    #[test]
    fn test_resolve_nested_reference() {
        let mut inner = Group::new();
        inner.insert_array("x", ArrayNode::new(DataArray::Int8(vec![1])));
        let mut root = Group::new();
        root.insert("g", Node::Group(inner));
        root.insert_array(
            "a0",
            ArrayNode::new(DataArray::Int8(vec![])).with_attr("link", Reference::to("g/x")),
        );

        let node = root.resolve(&Reference::to("/g/x")).unwrap();
        assert_eq!(node.as_array().unwrap().data, DataArray::Int8(vec![1]));
        assert!(root.resolve(&Reference::to("/g/y")).is_none());
        assert!(root.resolve(&Reference::to("/a0/z")).is_none());

        let refs = root.references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].0, "link");
        assert_eq!(refs[0].1.path(), "/g/x");
    }
}
