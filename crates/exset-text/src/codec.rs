//! CSV + metadata codec.

use std::io::{Read, Write};

use exset_model::{
    Annotation, ColumnRenames, Dataset, ExampleSet, ExchangeError, FormatVersion, MetadataMap,
    MetadataWarning, Result, SemanticType, TypeInference, sanitize_names,
};

use crate::decode::ColumnBuilder;
use crate::document::{MetadataDocument, MetadataEntry};
use crate::encode::encode_column;
use crate::options::TextCodecOptions;

/// Outcome of a successful write.
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    /// Number of data rows written.
    pub rows: usize,
    /// Resolved `(type, role)` per column, under the original column names.
    pub columns: Vec<MetadataEntry>,
    /// Columns that had to be renamed internally.
    pub renames: ColumnRenames,
    /// Non-fatal metadata problems.
    pub warnings: Vec<MetadataWarning>,
}

/// Reads and writes example sets as a headerless CSV stream plus a JSON
/// metadata stream.
#[derive(Debug, Clone, Default)]
pub struct TextCodec {
    options: TextCodecOptions,
    inference: TypeInference,
}

impl TextCodec {
    pub fn new(options: TextCodecOptions) -> Self {
        Self {
            options,
            inference: TypeInference::lenient(),
        }
    }

    pub fn options(&self) -> &TextCodecOptions {
        &self.options
    }

    /// Write an example set. Nothing is written when a column fails to encode.
    pub fn write<C: Write, M: Write>(
        &self,
        set: &ExampleSet,
        csv_out: C,
        metadata_out: M,
    ) -> Result<WriteSummary> {
        let data = &set.data;
        let _span = tracing::info_span!(
            "text_write",
            columns = data.num_columns(),
            rows = data.num_rows()
        )
        .entered();

        let renames = sanitize_names(data.column_names());
        let mut warnings = Vec::new();
        let mut entries = Vec::with_capacity(data.num_columns());
        let mut fields = Vec::with_capacity(data.num_columns());

        for (column, safe_name) in data.columns().iter().zip(&renames.safe_names) {
            let annotation = set
                .annotation(&column.name)
                .or_else(|| set.annotation(safe_name));
            let meta = self.inference.resolve(column, annotation, &mut warnings)?;
            if meta.semantic_type == SemanticType::Binominal {
                let distinct = column.distinct_display_values().len();
                if distinct > 2 {
                    warnings.push(MetadataWarning::new(
                        Some(&column.name),
                        format!(
                            "binominal column has {distinct} distinct values; \
                             the table format rejects more than 2"
                        ),
                    ));
                }
            }
            fields.push(encode_column(
                column,
                meta.semantic_type,
                self.options.date_time_compat,
            )?);
            entries.push(MetadataEntry::new(
                column.name.as_str(),
                meta.semantic_type,
                meta.role,
            ));
        }

        let document = MetadataDocument::new(&self.options, entries);
        document.write_to(metadata_out)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(csv_out);
        for row in 0..data.num_rows() {
            writer
                .write_record(fields.iter().map(|column| column[row].as_str()))
                .map_err(csv_write_error)?;
        }
        writer.flush()?;

        tracing::debug!(renamed = renames.originals.len(), "example set written");
        Ok(WriteSummary {
            rows: data.num_rows(),
            columns: document.entries,
            renames,
            warnings,
        })
    }

    /// Read an example set.
    ///
    /// The returned metadata carries the recorded `(type, role)` of every
    /// column; zero data rows produce empty columns of the declared types.
    pub fn read<C: Read, M: Read>(&self, csv_in: C, metadata_in: M) -> Result<ExampleSet> {
        let _span = tracing::info_span!("text_read").entered();

        let document = MetadataDocument::from_reader(metadata_in)?;
        self.check_version(&document);

        let mut builders: Vec<ColumnBuilder> = document
            .entries
            .iter()
            .map(|entry| ColumnBuilder::new(entry.name.as_str(), entry.semantic_type))
            .collect();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_in);
        let mut record = csv::StringRecord::new();
        let mut rows = 0usize;
        while reader.read_record(&mut record).map_err(csv_read_error)? {
            rows += 1;
            if record.len() != builders.len() {
                return Err(ExchangeError::format(format!(
                    "row {rows} has {} fields but the metadata declares {} columns",
                    record.len(),
                    builders.len()
                )));
            }
            for (builder, field) in builders.iter_mut().zip(record.iter()) {
                builder.push(field)?;
            }
        }

        let data = Dataset::with_columns(builders.into_iter().map(ColumnBuilder::finish).collect())?;
        let metadata: MetadataMap = document
            .entries
            .into_iter()
            .map(|entry| {
                let annotation = Annotation::new(entry.semantic_type, entry.role.as_str());
                (entry.name, annotation)
            })
            .collect();
        tracing::debug!(rows, columns = data.num_columns(), "example set read");
        Ok(ExampleSet::new(data).with_metadata(metadata))
    }

    fn check_version(&self, document: &MetadataDocument) {
        if document.version.is_empty() {
            return;
        }
        match document.version.parse::<FormatVersion>() {
            Ok(version) if !self.options.version.is_at_least(&version) => {
                tracing::warn!(
                    written = %version,
                    reader = %self.options.version,
                    "metadata document was written by a newer library version"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(version = %document.version, "unparsable document version: {err}");
            }
        }
    }
}

fn csv_write_error(err: csv::Error) -> ExchangeError {
    ExchangeError::Io(err.into())
}

fn csv_read_error(err: csv::Error) -> ExchangeError {
    ExchangeError::format(format!("malformed CSV: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exset_model::{Column, SemanticType};

    fn write(set: &ExampleSet) -> (String, String, WriteSummary) {
        let mut csv = Vec::new();
        let mut pmd = Vec::new();
        let summary = TextCodec::default().write(set, &mut csv, &mut pmd).unwrap();
        (
            String::from_utf8(csv).unwrap(),
            String::from_utf8(pmd).unwrap(),
            summary,
        )
    }

    #[test]
    fn test_csv_has_no_header() {
        let set = ExampleSet::new(
            Dataset::with_columns(vec![
                Column::int64("n", [Some(1), None]),
                Column::utf8("s", [Some("a"), None]),
            ])
            .unwrap(),
        );
        let (csv, _, summary) = write(&set);
        assert_eq!(csv, "1,YQ==\n,null\n");
        assert_eq!(summary.rows, 2);
    }

    #[test]
    fn test_nominal_is_narrowed() {
        let set = ExampleSet::new(
            Dataset::with_columns(vec![Column::utf8("s", [Some("a"), Some("b")])]).unwrap(),
        )
        .with_annotation("s", Annotation::raw(Some("nominal"), Some("label")));
        let (_, pmd, summary) = write(&set);
        assert_eq!(summary.columns[0].semantic_type, SemanticType::Binominal);
        assert!(pmd.contains(r#"[{"s": ["binominal", "label"]}]"#));
    }

    #[test]
    fn test_lenient_unknown_type_warns() {
        let set = ExampleSet::new(
            Dataset::with_columns(vec![Column::float64("x", [Some(1.5)])]).unwrap(),
        )
        .with_annotation("x", Annotation::raw(Some("imaginary"), None));
        let (_, pmd, summary) = write(&set);
        assert_eq!(summary.warnings.len(), 1);
        assert!(pmd.contains(r#"{"x": ["real", null]}"#));
    }

    #[test]
    fn test_column_count_mismatch() {
        let pmd = r#"{"metadata": [{"a": ["integer", null]}, {"b": ["real", null]}]}"#;
        let err = TextCodec::default()
            .read("1,2\n3\n".as_bytes(), pmd.as_bytes())
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Format { .. }));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_newer_document_still_reads() {
        let pmd = r#"{"version": "99.0.0", "metadata": [{"a": ["integer", null]}]}"#;
        let set = TextCodec::default()
            .read("7\n".as_bytes(), pmd.as_bytes())
            .unwrap();
        assert_eq!(set.data.columns()[0], Column::int64("a", [Some(7)]));
    }
}
