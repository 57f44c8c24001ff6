//! Container tree to example set.

use exset_model::timestamp::NANOS_PER_SECOND;
use exset_model::{
    Annotation, Column, ColumnValues, ContainerRole, Dataset, ExampleSet, ExchangeError, Result,
    Role, SemanticType, ValueKind,
};

use super::dictionary;
use super::wire::{
    ADDITIONAL, COLUMNS, DICTIONARY, LEGACY_ROLE, LEGACY_TYPE, MISSING_DATE_TIME, NAME,
    POSITIVE_INDEX, ROLE, ROWS, TYPE, WireType, column_entry, float_value, integer_values,
    type_from_code,
};
use crate::container::{ArrayNode, AttrValue, Attributes, DataArray, Group, Node};

const DATE_RANGE: &str = "date outside the representable range 1677-09-21 to 2262-04-11";

/// Rebuild an example set from a container tree.
pub(crate) fn decode_set(root: &Group) -> Result<ExampleSet> {
    let count = root
        .attrs
        .get_int(COLUMNS)
        .ok_or_else(|| ExchangeError::format("missing 'columns' header attribute"))?;
    let count = usize::try_from(count)
        .map_err(|_| ExchangeError::format(format!("invalid column count {count}")))?;
    let rows = root.attrs.get_int(ROWS);

    let mut columns = Vec::with_capacity(count.min(root.len()));
    let mut annotations = Vec::with_capacity(columns.capacity());
    for index in 0..count {
        let entry_name = column_entry(index);
        let entry = root.array(&entry_name).ok_or_else(|| {
            ExchangeError::format(format!("missing column entry '{entry_name}'"))
        })?;
        let name = entry.attrs.get_str(NAME).ok_or_else(|| {
            ExchangeError::format(format!("column entry '{entry_name}' has no name"))
        })?;

        let values = column_values(root, name, entry)?;
        if let Some(rows) = rows
            && i64::try_from(values.len()).ok() != Some(rows)
        {
            return Err(ExchangeError::format_in(
                name,
                format!("column has {} values but the header declares {rows} rows", values.len()),
            ));
        }
        let semantic_type = semantic_type(name, &entry.attrs, values.kind())?;
        let role = role(name, &entry.attrs)?;
        annotations.push((name.to_string(), Annotation::new(semantic_type, role.as_str())));
        columns.push(Column::new(name, values));
    }

    let data = Dataset::with_columns(columns)?;
    let metadata = annotations.into_iter().collect();
    Ok(ExampleSet::new(data).with_metadata(metadata))
}

fn wire_type(attrs: &Attributes) -> Option<WireType> {
    attrs.get_str(TYPE).and_then(WireType::parse)
}

fn column_values(root: &Group, name: &str, entry: &ArrayNode) -> Result<ColumnValues> {
    if let Some(dictionary) = entry.attrs.get(DICTIONARY) {
        let strings = dictionary_strings(root, name, dictionary)?;
        let codes = entry.data.to_i64().ok_or_else(|| {
            ExchangeError::format_in(name, "dictionary codes are not integers")
        })?;
        return Ok(ColumnValues::Utf8(dictionary::decode(name, &codes, strings)?));
    }

    let wire = wire_type(&entry.attrs);
    match wire {
        Some(WireType::DateTime | WireType::Date) => {
            let seconds = integers(name, &entry.data)?;
            let remainders = match (wire, entry.attrs.get(ADDITIONAL)) {
                (Some(WireType::DateTime), Some(AttrValue::Ref(reference))) => {
                    let sidecar = root
                        .resolve(reference)
                        .and_then(Node::as_array)
                        .ok_or_else(|| {
                            ExchangeError::format_in(
                                name,
                                format!("nanosecond entry '{reference}' not found"),
                            )
                        })?;
                    let remainders = integers(name, &sidecar.data)?;
                    if remainders.len() != seconds.len() {
                        return Err(ExchangeError::format_in(
                            name,
                            "nanosecond entry length differs from the column",
                        ));
                    }
                    Some(remainders)
                }
                _ => None,
            };
            let nanos = seconds
                .iter()
                .enumerate()
                .map(|(row, &seconds)| {
                    let remainder = remainders.as_ref().map_or(0, |r| r[row]);
                    timestamp_from_parts(name, seconds, remainder)
                })
                .collect::<Result<_>>()?;
            Ok(ColumnValues::Timestamp(nanos))
        }
        Some(WireType::Time) => Ok(ColumnValues::Timestamp(
            integers(name, &entry.data)?
                .into_iter()
                .map(|nanos| (nanos != MISSING_DATE_TIME).then_some(nanos))
                .collect(),
        )),
        Some(WireType::Integer) => match &entry.data {
            DataArray::Float64(values) => Ok(integer_values(values.clone())),
            data => Ok(ColumnValues::Int64(
                integers(name, data)?.into_iter().map(Some).collect(),
            )),
        },
        _ => Ok(match &entry.data {
            DataArray::Utf8(values) => ColumnValues::Utf8(values.iter().cloned().map(Some).collect()),
            DataArray::Float64(values) => {
                ColumnValues::Float64(values.iter().copied().map(float_value).collect())
            }
            data if wire == Some(WireType::Real) => ColumnValues::Float64(
                data.to_f64().unwrap_or_default().into_iter().map(float_value).collect(),
            ),
            data => ColumnValues::Int64(
                data.to_i64().unwrap_or_default().into_iter().map(Some).collect(),
            ),
        }),
    }
}

fn integers(name: &str, data: &DataArray) -> Result<Vec<i64>> {
    data.to_i64().ok_or_else(|| {
        ExchangeError::format_in(
            name,
            format!("expected integer data, found {}", data.type_name()),
        )
    })
}

fn dictionary_strings<'a>(
    root: &'a Group,
    name: &str,
    dictionary: &'a AttrValue,
) -> Result<&'a [String]> {
    match dictionary {
        AttrValue::StrList(values) => Ok(values),
        AttrValue::Ref(reference) => root
            .resolve(reference)
            .and_then(Node::as_array)
            .and_then(|array| array.data.as_strings())
            .ok_or_else(|| {
                ExchangeError::format_in(
                    name,
                    format!("dictionary '{reference}' is not a string entry"),
                )
            }),
        other => Err(ExchangeError::format_in(
            name,
            format!("dictionary attribute has type {}", other.type_name()),
        )),
    }
}

fn timestamp_from_parts(name: &str, seconds: i64, remainder: i64) -> Result<Option<i64>> {
    if seconds == MISSING_DATE_TIME {
        return Ok(None);
    }
    seconds
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|nanos| nanos.checked_add(remainder))
        .map(Some)
        .ok_or_else(|| {
            ExchangeError::date_conversion(name, Some(format!("{seconds}s")), DATE_RANGE)
        })
}

/// Semantic type from the legacy code, the wire type, then the values.
fn semantic_type(name: &str, attrs: &Attributes, kind: ValueKind) -> Result<SemanticType> {
    if let Some(code) = attrs.get_int(LEGACY_TYPE) {
        return type_from_code(code).ok_or_else(|| {
            ExchangeError::format_in(name, format!("unknown legacy type code {code}"))
        });
    }
    let semantic_type = match (wire_type(attrs), kind) {
        (Some(WireType::DateTime | WireType::Date), _) => SemanticType::DateTime,
        (Some(WireType::Time), _) => SemanticType::Time,
        (_, ValueKind::Integer) => SemanticType::Integer,
        (_, ValueKind::Float) => SemanticType::Real,
        (_, ValueKind::Timestamp) => SemanticType::DateTime,
        (_, ValueKind::Boolean) => SemanticType::Binominal,
        _ if attrs.contains(POSITIVE_INDEX) => SemanticType::Binominal,
        _ => SemanticType::Polynominal,
    };
    Ok(semantic_type)
}

fn role(name: &str, attrs: &Attributes) -> Result<Role> {
    let Some(stored) = attrs.get_str(ROLE) else {
        return Ok(Role::attribute());
    };
    let unknown = || ExchangeError::format_in(name, format!("role '{stored}' not recognized"));
    let role = ContainerRole::parse(stored).ok_or_else(unknown)?;
    Ok(role.join(attrs.get_str(LEGACY_ROLE)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Reference;

    fn single(entry: ArrayNode) -> Group {
        let rows = entry.data.len() as i32;
        let mut root = Group::new();
        root.attrs.set(ROWS, rows);
        root.attrs.set(COLUMNS, 1i32);
        root.insert_array("a0", entry.with_attr(NAME, "c"));
        root
    }

    #[test]
    fn test_unknown_role_is_fatal() {
        let root = single(
            ArrayNode::new(DataArray::Int64(vec![1]))
                .with_attr(TYPE, "Integer")
                .with_attr(ROLE, "CAPTAIN"),
        );
        let err = decode_set(&root).unwrap_err();
        assert_eq!(err.column(), Some("c"));
        assert!(err.to_string().contains("CAPTAIN"));
    }

    #[test]
    fn test_stored_role_must_be_upper_case() {
        let root = single(
            ArrayNode::new(DataArray::Int64(vec![1]))
                .with_attr(TYPE, "Integer")
                .with_attr(ROLE, "label"),
        );
        let err = decode_set(&root).unwrap_err();
        assert!(err.to_string().contains("role 'label' not recognized"));
    }

    #[test]
    fn test_score_role_uses_legacy_role() {
        let root = single(
            ArrayNode::new(DataArray::Float64(vec![0.5]))
                .with_attr(TYPE, "Real")
                .with_attr(ROLE, "SCORE")
                .with_attr(LEGACY_ROLE, "confidence_yes"),
        );
        let set = decode_set(&root).unwrap();
        let meta = set.column_metadata("c").unwrap();
        assert_eq!(meta.role.as_str(), "confidence_yes");
        assert_eq!(meta.semantic_type, SemanticType::Real);
    }

    #[test]
    fn test_integer_with_nan_reads_as_real() {
        let root = single(
            ArrayNode::new(DataArray::Float64(vec![1.0, f64::NAN])).with_attr(TYPE, "Integer"),
        );
        let set = decode_set(&root).unwrap();
        assert_eq!(
            set.data.columns()[0].values,
            ColumnValues::Float64(vec![Some(1.0), None])
        );
        assert_eq!(
            set.column_metadata("c").unwrap().semantic_type,
            SemanticType::Real
        );
    }

    #[test]
    fn test_date_without_remainder_is_seconds() {
        let root = single(
            ArrayNode::new(DataArray::Int64(vec![2, MISSING_DATE_TIME])).with_attr(TYPE, "Date"),
        );
        let set = decode_set(&root).unwrap();
        assert_eq!(
            set.data.columns()[0].values,
            ColumnValues::Timestamp(vec![Some(2 * NANOS_PER_SECOND), None])
        );
        assert_eq!(
            set.column_metadata("c").unwrap().semantic_type,
            SemanticType::DateTime
        );
    }

    #[test]
    fn test_date_overflow() {
        let root = single(
            ArrayNode::new(DataArray::Int64(vec![i64::MAX / 2])).with_attr(TYPE, "Date-Time"),
        );
        assert!(matches!(
            decode_set(&root).unwrap_err(),
            ExchangeError::DateConversion { .. }
        ));
    }

    #[test]
    fn test_referenced_dictionary() {
        let mut root = single(
            ArrayNode::new(DataArray::Int8(vec![3, 0, 1]))
                .with_attr(TYPE, "Nominal")
                .with_attr(DICTIONARY, Reference::to("d0")),
        );
        root.insert_array(
            "d0",
            ArrayNode::new(DataArray::Utf8(vec![
                "NULL".into(),
                "a".into(),
                "b".into(),
                "c".into(),
            ])),
        );
        let set = decode_set(&root).unwrap();
        assert_eq!(
            set.data.columns()[0].values,
            ColumnValues::Utf8(vec![Some("c".into()), None, Some("a".into())])
        );
        assert_eq!(
            set.column_metadata("c").unwrap().semantic_type,
            SemanticType::Polynominal
        );
    }

    #[test]
    fn test_positive_index_implies_binominal() {
        let root = single(
            ArrayNode::new(DataArray::Int8(vec![1]))
                .with_attr(TYPE, "Nominal")
                .with_attr(DICTIONARY, vec!["NULL".to_string(), "x".to_string()])
                .with_attr(POSITIVE_INDEX, 1i8),
        );
        let set = decode_set(&root).unwrap();
        assert_eq!(
            set.column_metadata("c").unwrap().semantic_type,
            SemanticType::Binominal
        );
    }

    #[test]
    fn test_missing_structure_is_format_error() {
        let mut root = Group::new();
        root.attrs.set(COLUMNS, 1i32);
        assert!(matches!(
            decode_set(&root).unwrap_err(),
            ExchangeError::Format { .. }
        ));
        assert!(matches!(
            decode_set(&Group::new()).unwrap_err(),
            ExchangeError::Format { .. }
        ));
    }
}
