//! Whole-file JSON array reads and atomic rewrites.

use cyclelog_error::{CyclelogResult, StorageError, StorageErrorKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// Outcome of reading a JSON array file.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRead<T> {
    /// File existed and parsed
    Loaded(Vec<T>),
    /// File does not exist
    Missing,
    /// File exists but is not a JSON array (of `T`, for strict reads)
    Corrupt(String),
}

impl<T> JsonRead<T> {
    /// Collapse misses and parse failures to an empty list.
    pub fn or_empty(self) -> Vec<T> {
        match self {
            JsonRead::Loaded(items) => items,
            JsonRead::Missing | JsonRead::Corrupt(_) => Vec::new(),
        }
    }
}

async fn read_text(path: &Path) -> CyclelogResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("File not present");
            Ok(None)
        }
        Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()),
    }
}

/// Read `path` as a JSON array where every element must decode as `T`.
///
/// Used for the metadata tables and the sessions file, whose records are
/// written only by Cyclelog itself.
///
/// # Errors
///
/// Only I/O failures other than "not found" are errors (permission denied,
/// path is a directory, ...). Misses and parse failures are reported through
/// [`JsonRead`].
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub async fn read_json_vec<T: DeserializeOwned>(path: &Path) -> CyclelogResult<JsonRead<T>> {
    let Some(content) = read_text(path).await? else {
        return Ok(JsonRead::Missing);
    };

    match serde_json::from_str::<Vec<T>>(&content) {
        Ok(items) => Ok(JsonRead::Loaded(items)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse JSON file");
            Ok(JsonRead::Corrupt(e.to_string()))
        }
    }
}

/// Read `path` as a JSON array of raw records.
///
/// Only a syntax error or a top level that is not an array makes the file
/// [`JsonRead::Corrupt`]; the elements themselves are not inspected.
///
/// # Errors
///
/// Same as [`read_json_vec`].
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub async fn read_json_records(path: &Path) -> CyclelogResult<JsonRead<Value>> {
    let Some(content) = read_text(path).await? else {
        return Ok(JsonRead::Missing);
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(records)) => Ok(JsonRead::Loaded(records)),
        Ok(other) => {
            let reason = format!("top level is {}, expected an array", json_type(&other));
            tracing::warn!(reason = %reason, "JSON file is not an array");
            Ok(JsonRead::Corrupt(reason))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse JSON file");
            Ok(JsonRead::Corrupt(e.to_string()))
        }
    }
}

/// Read `path` as a JSON array, keeping the elements that decode as `T`.
///
/// Elements that don't fit `T` are logged and dropped; the rest of the file
/// is still returned.
///
/// # Errors
///
/// Same as [`read_json_vec`].
#[tracing::instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub async fn read_json_lenient<T: DeserializeOwned>(path: &Path) -> CyclelogResult<JsonRead<T>> {
    let records = match read_json_records(path).await? {
        JsonRead::Loaded(records) => records,
        JsonRead::Missing => return Ok(JsonRead::Missing),
        JsonRead::Corrupt(reason) => return Ok(JsonRead::Corrupt(reason)),
    };

    let items = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<T>(record) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping record that does not decode");
                None
            }
        })
        .collect();

    Ok(JsonRead::Loaded(items))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Write `value` as pretty JSON via a temp file + rename.
#[tracing::instrument(level = "debug", skip(path, value), fields(path = %path.display()))]
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> CyclelogResult<()> {
    let serialized = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                parent.display(),
                e
            )))
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, serialized).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            temp_path.display(),
            e
        )))
    })?;

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::Rename(format!(
            "{} -> {}: {}",
            temp_path.display(),
            path.display(),
            e
        )))
    })?;

    Ok(())
}
