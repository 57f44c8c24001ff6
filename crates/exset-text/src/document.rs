//! Metadata side channel.
//!
//! The document is a JSON object with a fixed header and one single-key
//! object per column:
//!
//! ```text
//! {
//!   "source": "RapidMiner Python Scripting Extension and Library",
//!   "module": "Python",
//!   "version": "9.4.0",
//!   "metadata":
//! [{"id": ["integer", "id"]}, {"score": ["real", null]}]
//! }
//! ```
//!
//! The `metadata` array is rendered the way Python's `json.dumps` renders it
//! (`", "` and `": "` separators, non-ASCII escaped), which consumers on the
//! platform side compare byte for byte.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;

use exset_model::{ExchangeError, Result, Role, SemanticType};

use crate::options::TextCodecOptions;

/// Type and role of one column as recorded in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub name: String,
    pub semantic_type: SemanticType,
    pub role: Role,
}

impl MetadataEntry {
    pub fn new(name: impl Into<String>, semantic_type: SemanticType, role: Role) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            role,
        }
    }

    /// Role as written: `None` for the default role.
    pub fn wire_role(&self) -> Option<&str> {
        (!self.role.is_attribute()).then(|| self.role.as_str())
    }
}

/// Parsed or to-be-written metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataDocument {
    pub source: String,
    pub module: String,
    pub version: String,
    pub entries: Vec<MetadataEntry>,
}

impl MetadataDocument {
    /// Build a document with the header taken from codec options.
    pub fn new(options: &TextCodecOptions, entries: Vec<MetadataEntry>) -> Self {
        Self {
            source: options.source.clone(),
            module: options.module.clone(),
            version: options.version.to_string(),
            entries,
        }
    }

    /// Write the document.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(b"{\n")?;
        for (key, value) in [
            ("source", &self.source),
            ("module", &self.module),
            ("version", &self.version),
        ] {
            write!(writer, "  \"{key}\": ")?;
            write_python_json(&mut writer, value)?;
            writer.write_all(b",\n")?;
        }
        writer.write_all(b"  \"metadata\":\n")?;
        let columns: Vec<BTreeMap<&str, (&str, Option<&str>)>> = self
            .entries
            .iter()
            .map(|entry| {
                BTreeMap::from([(
                    entry.name.as_str(),
                    (entry.semantic_type.as_str(), entry.wire_role()),
                )])
            })
            .collect();
        write_python_json(&mut writer, &columns)?;
        writer.write_all(b"\n}")?;
        writer.flush()
    }

    /// Render the document to a string.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Parse a document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).map_err(|err| {
            ExchangeError::format(format!("metadata document is not valid JSON: {err}"))
        })?;
        Self::from_value(&value)
    }

    /// Parse a document from a JSON value.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(ExchangeError::format(
                "metadata document must be a JSON object",
            ));
        };
        let Some(Value::Array(items)) = root.get("metadata") else {
            return Err(ExchangeError::format(
                "metadata document has no 'metadata' array",
            ));
        };
        let entries = items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_entry(index, item))
            .collect::<Result<Vec<_>>>()?;

        let header = |key: &str| {
            root.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Self {
            source: header("source"),
            module: header("module"),
            version: header("version"),
            entries,
        })
    }
}

fn parse_entry(index: usize, item: &Value) -> Result<MetadataEntry> {
    let Some((name, value)) = item
        .as_object()
        .filter(|object| object.len() == 1)
        .and_then(|object| object.iter().next())
    else {
        return Err(ExchangeError::format(format!(
            "metadata entry {index} must be an object with exactly one column name, found {item}"
        )));
    };

    let pair = match value {
        Value::Array(pair) if (1..=2).contains(&pair.len()) => pair,
        other => {
            return Err(ExchangeError::format_in(
                name.as_str(),
                format!("expected [type, role], found {other}"),
            ));
        }
    };
    let raw_type = pair[0].as_str().ok_or_else(|| {
        ExchangeError::format_in(
            name.as_str(),
            format!("semantic type must be a string, found {}", pair[0]),
        )
    })?;
    let semantic_type = raw_type
        .parse::<SemanticType>()
        .map_err(|err| ExchangeError::format_in(name.as_str(), err.to_string()))?;
    let role = match pair.get(1) {
        None | Some(Value::Null) => Role::attribute(),
        Some(Value::String(role)) => Role::new(role.as_str()),
        Some(other) => {
            return Err(ExchangeError::format_in(
                name.as_str(),
                format!("role must be a string or null, found {other}"),
            ));
        }
    };
    Ok(MetadataEntry::new(name.as_str(), semantic_type, role))
}

fn write_python_json<W, T>(writer: &mut W, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    let mut serializer = serde_json::Serializer::with_formatter(writer, PythonFormatter);
    value.serialize(&mut serializer).map_err(io::Error::from)
}

/// JSON formatter reproducing Python's default `json.dumps` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exset_model::FormatVersion;

    fn options() -> TextCodecOptions {
        TextCodecOptions::new().with_version(FormatVersion::new(9, 4, 0))
    }

    #[test]
    fn test_python_separators_and_escaping() {
        let mut out = Vec::new();
        write_python_json(
            &mut out,
            &vec![BTreeMap::from([("Größe", ("real", None::<&str>))])],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[{"Gr\u00f6\u00dfe": ["real", null]}]"#
        );
    }

    #[test]
    fn test_astral_plane_uses_surrogates() {
        let mut out = Vec::new();
        write_python_json(&mut out, "a\u{1F600}\u{7f}").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#""a\ud83d\ude00\u007f""#);
    }

    #[test]
    fn test_render_header() {
        let doc = MetadataDocument::new(
            &options(),
            vec![
                MetadataEntry::new("id", SemanticType::Integer, Role::new("id")),
                MetadataEntry::new("x", SemanticType::Real, Role::attribute()),
            ],
        );
        let rendered = doc.render();
        assert!(rendered.starts_with("{\n  \"source\": "));
        assert!(rendered.contains("  \"version\": \"9.4.0\",\n"));
        assert!(rendered.ends_with(
            "  \"metadata\":\n[{\"id\": [\"integer\", \"id\"]}, {\"x\": [\"real\", null]}]\n}"
        ));
    }

    #[test]
    fn test_parse_written_document() {
        let doc = MetadataDocument::new(
            &options(),
            vec![MetadataEntry::new(
                "label",
                SemanticType::Binominal,
                Role::new("label"),
            )],
        );
        let parsed = MetadataDocument::from_reader(doc.render().as_bytes()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_null_and_missing_role_is_attribute() {
        let parsed = MetadataDocument::from_value(&serde_json::json!({
            "metadata": [{"a": ["text", null]}, {"b": ["numeric"]}]
        }))
        .unwrap();
        assert!(parsed.entries[0].role.is_attribute());
        assert_eq!(parsed.entries[1].semantic_type, SemanticType::Real);
        assert!(parsed.entries[1].role.is_attribute());
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(MetadataDocument::from_reader(&b"{not json"[..]).is_err());
        assert!(MetadataDocument::from_value(&serde_json::json!({"metadata": 3})).is_err());
        let err = MetadataDocument::from_value(&serde_json::json!({
            "metadata": [{"a": "integer"}]
        }))
        .unwrap_err();
        assert_eq!(err.column(), Some("a"));
    }
}
