//! Command implementations.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use exset_model::{Column, ColumnValues, Dataset, ExampleSet, MetadataMap, parse_annotations};
use exset_table::{TableCodec, TableLayout};
use exset_text::{TextCodec, TextCodecOptions, WriteSummary};

/// Extension of the CSV half of a text pair.
pub const CSV_EXTENSION: &str = "csv-encoded";
/// Extension of the metadata half of a text pair.
pub const METADATA_EXTENSION: &str = "pmd-encoded";

/// Paths of an encoded text pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPair {
    pub csv: PathBuf,
    pub metadata: PathBuf,
}

impl TextPair {
    /// Pair for a base path. A trailing pair extension on `base` is dropped.
    pub fn from_base(base: &Path) -> Self {
        let base = match base.extension().and_then(|ext| ext.to_str()) {
            Some(CSV_EXTENSION | METADATA_EXTENSION) => base.with_extension(""),
            _ => base.to_path_buf(),
        };
        Self {
            csv: append_extension(&base, CSV_EXTENSION),
            metadata: append_extension(&base, METADATA_EXTENSION),
        }
    }
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Output format of `convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Table,
    Text,
}

/// Files produced by a command.
#[derive(Debug, Clone)]
pub enum Written {
    Table(PathBuf),
    Text(TextPair, WriteSummary),
}

/// Read an encoded text pair.
pub fn read_text_pair(pair: &TextPair) -> Result<ExampleSet> {
    let csv = File::open(&pair.csv).with_context(|| format!("open {}", pair.csv.display()))?;
    let metadata = File::open(&pair.metadata)
        .with_context(|| format!("open {}", pair.metadata.display()))?;
    TextCodec::default()
        .read(BufReader::new(csv), BufReader::new(metadata))
        .with_context(|| format!("read {}", pair.csv.display()))
}

/// Write an example set as an encoded text pair.
pub fn write_text_pair(
    set: &ExampleSet,
    base: &Path,
    options: TextCodecOptions,
) -> Result<(TextPair, WriteSummary)> {
    let pair = TextPair::from_base(base);
    let codec = TextCodec::new(options);
    // encode into memory first so a failing column leaves no files behind
    let (mut csv, mut metadata) = (Vec::new(), Vec::new());
    let summary = codec
        .write(set, &mut csv, &mut metadata)
        .context("encode text pair")?;
    write_bytes(&pair.csv, &csv)?;
    write_bytes(&pair.metadata, &metadata)?;
    info!(
        csv = %pair.csv.display(),
        rows = summary.rows,
        columns = summary.columns.len(),
        "wrote text pair"
    );
    Ok((pair, summary))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|()| writer.flush())
        .with_context(|| format!("write {}", path.display()))
}

/// Text pair to table file.
pub fn run_encode(input: &Path, output: &Path) -> Result<PathBuf> {
    let set = read_text_pair(&TextPair::from_base(input))?;
    TableCodec::new()
        .write_file(&set, output)
        .with_context(|| format!("write {}", output.display()))
}

/// Table file to text pair.
pub fn run_decode(
    input: &Path,
    output: &Path,
    options: TextCodecOptions,
) -> Result<(TextPair, WriteSummary)> {
    let set = TableCodec::new()
        .read_file(input)
        .with_context(|| format!("read {}", input.display()))?;
    write_text_pair(&set, output, options)
}

/// CSV with a header row to a table file or text pair.
pub fn run_convert(
    input: &Path,
    output: &Path,
    target: Target,
    annotations: Option<&Path>,
    options: TextCodecOptions,
) -> Result<Written> {
    let data = read_plain_csv(input)?;
    let metadata = match annotations {
        Some(path) => load_annotations(path)?,
        None => MetadataMap::new(),
    };
    let set = ExampleSet::new(data).with_metadata(metadata);
    match target {
        Target::Table => {
            let path = TableCodec::new()
                .write_file(&set, output)
                .with_context(|| format!("write {}", output.display()))?;
            Ok(Written::Table(path))
        }
        Target::Text => {
            let (pair, summary) = write_text_pair(&set, output, options)?;
            Ok(Written::Text(pair, summary))
        }
    }
}

/// Layout of a table file.
pub fn run_inspect(input: &Path) -> Result<TableLayout> {
    TableLayout::read_file(input).with_context(|| format!("inspect {}", input.display()))
}

/// Load `{"column": ["type", "role"]}` annotations from a JSON file.
pub fn load_annotations(path: &Path) -> Result<MetadataMap> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    let (map, warnings) = parse_annotations(&value)?;
    if !warnings.is_empty() {
        info!(count = warnings.len(), "annotations loaded with warnings");
    }
    Ok(map)
}

/// Read a CSV file with a header row, inferring one value kind per column.
///
/// Empty fields are missing. A column is integer when every value parses as
/// an integer, real when every value parses as a number, boolean when every
/// value is `true` or `false`, and text otherwise.
pub fn read_plain_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read {}", path.display()))?;
        if record.len() != headers.len() {
            bail!(
                "row {} of {} has {} fields, expected {}",
                line + 1,
                path.display(),
                record.len(),
                headers.len()
            );
        }
        for (values, field) in raw.iter_mut().zip(record.iter()) {
            values.push((!field.is_empty()).then(|| field.to_string()));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| Column::new(name, infer_values(values)))
        .collect();
    Dataset::with_columns(columns).context("build dataset")
}

fn infer_values(values: Vec<Option<String>>) -> ColumnValues {
    let present = || values.iter().flatten();
    if present().next().is_none() {
        return ColumnValues::Utf8(values);
    }
    if present().all(|v| v.parse::<i64>().is_ok()) {
        return ColumnValues::Int64(
            values.iter().map(|v| v.as_ref().and_then(|v| v.parse().ok())).collect(),
        );
    }
    if present().all(|v| v.parse::<f64>().is_ok()) {
        return ColumnValues::Float64(
            values.iter().map(|v| v.as_ref().and_then(|v| v.parse().ok())).collect(),
        );
    }
    if present().all(|v| parse_bool(v).is_some()) {
        return ColumnValues::Boolean(
            values.iter().map(|v| v.as_deref().and_then(parse_bool)).collect(),
        );
    }
    ColumnValues::Utf8(values)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_pair_paths() {
        let pair = TextPair::from_base(Path::new("out/churn"));
        assert_eq!(pair.csv, PathBuf::from("out/churn.csv-encoded"));
        assert_eq!(pair.metadata, PathBuf::from("out/churn.pmd-encoded"));
        assert_eq!(TextPair::from_base(Path::new("out/churn.pmd-encoded")), pair);
    }

    #[test]
    fn test_infer_values() {
        let owned = |values: &[Option<&str>]| -> Vec<Option<String>> {
            values.iter().map(|v| v.map(str::to_string)).collect()
        };
        assert_eq!(
            infer_values(owned(&[Some("1"), None, Some("-2")])),
            ColumnValues::Int64(vec![Some(1), None, Some(-2)])
        );
        assert_eq!(
            infer_values(owned(&[Some("1"), Some("2.5")])),
            ColumnValues::Float64(vec![Some(1.0), Some(2.5)])
        );
        assert_eq!(
            infer_values(owned(&[Some("true"), Some("False")])),
            ColumnValues::Boolean(vec![Some(true), Some(false)])
        );
        assert_eq!(
            infer_values(owned(&[Some("a"), Some("1")])),
            ColumnValues::Utf8(vec![Some("a".into()), Some("1".into())])
        );
        assert_eq!(infer_values(owned(&[None])), ColumnValues::Utf8(vec![None]));
    }
}
