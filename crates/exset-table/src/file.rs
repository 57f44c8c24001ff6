//! Table files on disk.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use exset_model::{ExampleSet, ExchangeError, Result};

use crate::codec::TableCodec;

/// File extension of table files.
pub const TABLE_EXTENSION: &str = "rmhdf5table";

fn with_table_extension(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(TABLE_EXTENSION);
    PathBuf::from(name)
}

/// Path to read: the path itself, or `<path>.rmhdf5table` when only that exists.
pub fn resolve_read_path(path: &Path) -> PathBuf {
    if !path.exists() {
        let candidate = with_table_extension(path);
        if candidate.is_file() {
            return candidate;
        }
    }
    path.to_path_buf()
}

/// Path to write: adds the table extension when the path has none.
pub fn resolve_write_path(path: &Path) -> PathBuf {
    if path.extension().is_none() {
        with_table_extension(path)
    } else {
        path.to_path_buf()
    }
}

impl TableCodec {
    /// Write an example set to a table file and return the path written.
    ///
    /// The set is encoded before the file is touched, then written to a
    /// temporary sibling file and renamed over the target.
    pub fn write_file(&self, set: &ExampleSet, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = resolve_write_path(path.as_ref());
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.is_dir()
        {
            return Err(ExchangeError::storage(
                format!("directory '{}' does not exist", parent.display()),
                Some(path),
            ));
        }

        let mut bytes = Vec::new();
        self.write(set, &mut bytes)?;

        let temp_path = path.with_extension(format!("{TABLE_EXTENSION}.tmp"));
        let storage = |message: &str, err: std::io::Error| {
            ExchangeError::storage_with_source(message, Some(path.clone()), err)
        };
        let mut file = File::create(&temp_path).map_err(|e| storage("cannot create table file", e))?;
        file.write_all(&bytes)
            .map_err(|e| storage("cannot write table file", e))?;
        file.sync_all()
            .map_err(|e| storage("cannot write table file", e))?;
        drop(file);
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(storage("cannot replace table file", err));
        }

        tracing::info!(
            path = %path.display(),
            rows = set.data.num_rows(),
            columns = set.data.num_columns(),
            "wrote table file"
        );
        Ok(path)
    }

    /// Read an example set from a table file.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<ExampleSet> {
        let path = resolve_read_path(path.as_ref());
        let bytes = fs::read(&path).map_err(|err| {
            ExchangeError::storage_with_source("cannot read table file", Some(path.clone()), err)
        })?;
        let set = self.read(&bytes[..]).map_err(|err| match err {
            ExchangeError::Storage {
                message,
                path: None,
                source,
            } => ExchangeError::Storage {
                message,
                path: Some(path.clone()),
                source,
            },
            other => other,
        })?;
        tracing::info!(
            path = %path.display(),
            rows = set.data.num_rows(),
            columns = set.data.num_columns(),
            "read table file"
        );
        Ok(set)
    }
}

/// Write an example set with the default codec.
pub fn write_table_file(set: &ExampleSet, path: impl AsRef<Path>) -> Result<PathBuf> {
    TableCodec::new().write_file(set, path)
}

/// Read an example set with the default codec.
pub fn read_table_file(path: impl AsRef<Path>) -> Result<ExampleSet> {
    TableCodec::new().read_file(path)
}
