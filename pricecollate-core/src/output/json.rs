//! Pretty JSON files.

use super::{write_atomic, OutputError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serialize `value` as pretty JSON (two-space indent) and write it to `path`,
/// replacing any existing file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| OutputError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_atomic(path, json.as_bytes())
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, OutputError> {
    let content = fs::read_to_string(path).map_err(|e| OutputError::fs(path, e))?;
    serde_json::from_str(&content).map_err(|e| OutputError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}
