//! Structural view of a table container.

use std::io::Read;
use std::path::Path;

use exset_model::{ExchangeError, Result, SemanticType};

use crate::codec::INVALID_CONTAINER;
use crate::codec::dictionary::DictionaryPlacement;
use crate::codec::wire::{
    ADDITIONAL, COLUMNS, DICTIONARY, LEGACY_ROLE, LEGACY_TYPE, NAME, POSITIVE_INDEX, ROLE, ROWS,
    TYPE, column_entry, type_from_code,
};
use crate::container::{AttrValue, ContainerReader, Group, Node};
use crate::file::resolve_read_path;

/// Dictionary of a nominal column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryLayout {
    pub placement: DictionaryPlacement,
    /// Referenced entry path, for out-of-line dictionaries.
    pub entry: Option<String>,
    /// Number of real values, placeholder excluded.
    pub distinct: usize,
}

/// Storage details of one column entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub entry: String,
    pub name: Option<String>,
    pub wire_type: Option<String>,
    pub legacy_type: Option<SemanticType>,
    pub role: Option<String>,
    pub legacy_role: Option<String>,
    /// Storage type of the entry's array.
    pub storage: &'static str,
    pub len: usize,
    pub dictionary: Option<DictionaryLayout>,
    pub positive_index: Option<i64>,
    /// Nanosecond remainder entry of a date-time column.
    pub additional: Option<String>,
}

/// Header counts and per-column layout of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub revision: u16,
    pub rows: Option<i64>,
    pub columns: Vec<ColumnLayout>,
}

impl TableLayout {
    /// Describe a container tree. Entries missing from the tree are skipped.
    pub fn from_group(revision: u16, root: &Group) -> Self {
        let count = root
            .attrs
            .get_int(COLUMNS)
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or(0);
        let columns = (0..count)
            .filter_map(|index| {
                let entry = column_entry(index);
                let node = root.array(&entry)?;
                let attrs = &node.attrs;
                let text = |key: &str| attrs.get_str(key).map(str::to_string);
                Some(ColumnLayout {
                    name: text(NAME),
                    wire_type: text(TYPE),
                    legacy_type: attrs.get_int(LEGACY_TYPE).and_then(type_from_code),
                    role: text(ROLE),
                    legacy_role: text(LEGACY_ROLE),
                    storage: node.data.type_name(),
                    len: node.data.len(),
                    dictionary: attrs.get(DICTIONARY).and_then(|value| dictionary(root, value)),
                    positive_index: attrs.get_int(POSITIVE_INDEX),
                    additional: match attrs.get(ADDITIONAL) {
                        Some(AttrValue::Ref(reference)) => Some(reference.path().to_string()),
                        _ => None,
                    },
                    entry,
                })
            })
            .collect();
        Self {
            revision,
            rows: root.attrs.get_int(ROWS),
            columns,
        }
    }

    /// Read a container and describe it.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let container = ContainerReader::new(reader)
            .verify_references(false)
            .read()
            .map_err(|err| ExchangeError::storage_with_source(INVALID_CONTAINER, None, err))?;
        Ok(Self::from_group(container.revision, &container.root))
    }

    /// Describe a table file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_read_path(path.as_ref());
        let file = std::fs::File::open(&path).map_err(|err| {
            ExchangeError::storage_with_source("cannot read table file", Some(path.clone()), err)
        })?;
        Self::read(file)
    }

    /// Layout of the column with the given name.
    pub fn column(&self, name: &str) -> Option<&ColumnLayout> {
        self.columns
            .iter()
            .find(|column| column.name.as_deref() == Some(name))
    }
}

fn dictionary(root: &Group, value: &AttrValue) -> Option<DictionaryLayout> {
    match value {
        AttrValue::StrList(values) => Some(DictionaryLayout {
            placement: DictionaryPlacement::Inline,
            entry: None,
            distinct: values.len().saturating_sub(1),
        }),
        AttrValue::Ref(reference) => {
            let distinct = match root.resolve(reference) {
                Some(Node::Array(array)) => array.data.len().saturating_sub(1),
                _ => 0,
            };
            Some(DictionaryLayout {
                placement: DictionaryPlacement::Referenced,
                entry: Some(reference.path().to_string()),
                distinct,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TableCodec;
    use exset_model::{Annotation, Column, Dataset, ExampleSet};

    #[test]
    fn test_layout_of_encoded_set() {
        let set = ExampleSet::new(
            Dataset::with_columns(vec![
                Column::utf8("flag", [Some("y"), Some("n")]),
                Column::utf8("city", [Some("a"), Some("b")]),
                Column::timestamp("t", [Some(1), None]),
            ])
            .unwrap(),
        )
        .with_annotation("flag", Annotation::new(SemanticType::Binominal, "label"))
        .with_annotation("city", Annotation::typed(SemanticType::Text));

        let root = TableCodec::new().encode(&set).unwrap();
        let layout = TableLayout::from_group(1, &root);
        assert_eq!(layout.rows, Some(2));
        assert_eq!(layout.columns.len(), 3);

        let flag = layout.column("flag").unwrap();
        assert_eq!(flag.positive_index, Some(2));
        assert_eq!(flag.legacy_type, Some(SemanticType::Binominal));
        assert_eq!(flag.role.as_deref(), Some("LABEL"));
        assert_eq!(
            flag.dictionary.as_ref().map(|d| d.placement),
            Some(DictionaryPlacement::Inline)
        );

        let city = layout.column("city").unwrap();
        assert_eq!(city.legacy_type, Some(SemanticType::Text));
        assert_eq!(city.positive_index, None);

        let t = layout.column("t").unwrap();
        assert_eq!(t.wire_type.as_deref(), Some("Date-Time"));
        assert_eq!(t.additional.as_deref(), Some("/a2a"));
        assert_eq!(t.storage, "int64");
    }
}
