//! Example set to container tree.

use exset_model::timestamp::{NANOS_PER_DAY, NANOS_PER_SECOND};
use exset_model::{
    Column, ColumnMetadata, ColumnValues, ContainerRole, ExampleSet, ExchangeError, Result,
    SemanticType, TypeInference,
};

use super::dictionary::{self, DictionaryPlacement};
use super::wire::{
    ADDITIONAL, COLUMNS, DICTIONARY, IntegerPayload, LEGACY_ROLE, LEGACY_TYPE, MISSING_DATE_TIME,
    NAME, POSITIVE_INDEX, ROLE, ROWS, TYPE, WireType, additional_entry, column_entry,
    dictionary_entry, integer_payload, legacy_type_code,
};
use crate::container::{ArrayNode, DataArray, Group, Reference};

/// Build the container tree of an example set.
pub(crate) fn encode_set(set: &ExampleSet, inference: &TypeInference) -> Result<Group> {
    let data = &set.data;
    let mut root = Group::new();
    root.attrs.set(ROWS, header_count("row", data.num_rows())?);
    root.attrs.set(COLUMNS, header_count("column", data.num_columns())?);

    let mut warnings = Vec::new();
    for (index, column) in data.columns().iter().enumerate() {
        let meta = inference.resolve(column, set.annotation(&column.name), &mut warnings)?;
        encode_column(&mut root, index, column, &meta)?;
    }
    Ok(root)
}

fn header_count(what: &str, count: usize) -> Result<i32> {
    i32::try_from(count).map_err(|_| {
        ExchangeError::storage(format!("{what} count {count} exceeds the table format limit"), None)
    })
}

fn encode_column(
    root: &mut Group,
    index: usize,
    column: &Column,
    meta: &ColumnMetadata,
) -> Result<()> {
    let semantic_type = meta.semantic_type;
    let wire = WireType::for_semantic(semantic_type);
    let entry = column_entry(index);
    let mut sidecars = Vec::new();

    let mut node = match wire {
        WireType::Nominal => {
            let encoded = dictionary::encode(column);
            if semantic_type == SemanticType::Binominal && encoded.distinct() > 2 {
                return Err(ExchangeError::too_many_values(
                    column.name.as_str(),
                    encoded.distinct(),
                ));
            }
            let placement = encoded.placement();
            tracing::debug!(
                column = %column.name,
                distinct = encoded.distinct(),
                placement = placement.as_str(),
                "dictionary encoded column"
            );
            let mut node = ArrayNode::new(encoded.codes);
            match placement {
                DictionaryPlacement::Inline => {
                    if semantic_type == SemanticType::Binominal {
                        // last real entry is the positive class
                        let positive = (encoded.dictionary.len() - 1) as i8;
                        node.attrs.set(POSITIVE_INDEX, positive);
                    }
                    node.attrs.set(DICTIONARY, encoded.dictionary);
                }
                DictionaryPlacement::Referenced => {
                    let name = dictionary_entry(index);
                    node.attrs.set(DICTIONARY, Reference::to(name.as_str()));
                    sidecars.push((name, ArrayNode::new(DataArray::Utf8(encoded.dictionary))));
                }
            }
            node
        }
        WireType::Integer => ArrayNode::new(match integer_payload(&integer_values(column)?) {
            IntegerPayload::Exact(values) => DataArray::Int64(values),
            IntegerPayload::Demoted(values) => {
                tracing::debug!(column = %column.name, "integer column with missing values stored as float");
                DataArray::Float64(values)
            }
        }),
        WireType::Real => ArrayNode::new(DataArray::Float64(real_values(column)?)),
        WireType::DateTime | WireType::Date => {
            let nanos = date_values(column)?;
            let seconds = nanos
                .iter()
                .map(|value| value.map_or(MISSING_DATE_TIME, |n| n.div_euclid(NANOS_PER_SECOND)))
                .collect();
            let remainders = nanos
                .iter()
                .map(|value| value.map_or(0, |n| n.rem_euclid(NANOS_PER_SECOND) as i32))
                .collect();
            let name = additional_entry(index);
            sidecars.push((name.clone(), ArrayNode::new(DataArray::Int32(remainders))));
            ArrayNode::new(DataArray::Int64(seconds)).with_attr(ADDITIONAL, Reference::to(name))
        }
        WireType::Time => {
            let nanos = date_values(column)?
                .into_iter()
                .map(|value| value.map_or(MISSING_DATE_TIME, |n| n.rem_euclid(NANOS_PER_DAY)))
                .collect();
            ArrayNode::new(DataArray::Int64(nanos))
        }
    };

    node.attrs.set(NAME, column.name.as_str());
    node.attrs.set(TYPE, wire.as_str());
    if let Some(code) = legacy_type_code(semantic_type) {
        node.attrs.set(LEGACY_TYPE, code);
    }
    if let Some((role, legacy_role)) = ContainerRole::split(&meta.role) {
        node.attrs.set(ROLE, role.as_str());
        if let Some(legacy_role) = legacy_role {
            node.attrs.set(LEGACY_ROLE, legacy_role);
        }
    }

    root.insert_array(entry, node);
    for (name, sidecar) in sidecars {
        root.insert_array(name, sidecar);
    }
    Ok(())
}

fn not_convertible(column: &Column, value: String, target: &str) -> ExchangeError {
    ExchangeError::value_conversion(
        column.name.as_str(),
        Some(value),
        format!("cannot be stored as {target}"),
    )
}

fn integer_values(column: &Column) -> Result<Vec<Option<i64>>> {
    match &column.values {
        ColumnValues::Int64(values) | ColumnValues::Timestamp(values) => Ok(values.clone()),
        ColumnValues::Boolean(values) => Ok(values
            .iter()
            .map(|value| value.map(i64::from))
            .collect()),
        ColumnValues::Float64(values) => values
            .iter()
            .map(|value| match value {
                None => Ok(None),
                Some(v) if v.is_nan() => Ok(None),
                Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(*v as i64)),
                Some(v) => Err(not_convertible(column, v.to_string(), "an integer")),
            })
            .collect(),
        ColumnValues::Utf8(values) => values
            .iter()
            .map(|value| match value {
                None => Ok(None),
                Some(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| not_convertible(column, text.clone(), "an integer")),
            })
            .collect(),
    }
}

fn real_values(column: &Column) -> Result<Vec<f64>> {
    match &column.values {
        ColumnValues::Float64(values) => Ok(values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()),
        ColumnValues::Int64(values) | ColumnValues::Timestamp(values) => Ok(values
            .iter()
            .map(|v| v.map_or(f64::NAN, |n| n as f64))
            .collect()),
        ColumnValues::Boolean(values) => Ok(values
            .iter()
            .map(|v| v.map_or(f64::NAN, |b| if b { 1.0 } else { 0.0 }))
            .collect()),
        ColumnValues::Utf8(values) => values
            .iter()
            .map(|value| match value {
                None => Ok(f64::NAN),
                Some(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| not_convertible(column, text.clone(), "a real number")),
            })
            .collect(),
    }
}

fn date_values(column: &Column) -> Result<Vec<Option<i64>>> {
    (0..column.len()).map(|row| column.epoch_nanos(row)).collect()
}
