//! Output files — directory setup, JSON and CSV writers.
//!
//! Layout under the output directory:
//! - `historical.json` — raw ticker → day records mapping, pretty JSON
//! - `collated.json` — collated table as an array of arrays, header first
//! - `data.csv` — collated table, comma-separated, CRLF line endings
//!
//! Every file write is atomic: write to `{name}.tmp`, then rename into place.

pub mod delimited;
pub mod json;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use delimited::to_csv;
pub use json::{read_json, write_json};

pub const HISTORICAL_FILE: &str = "historical.json";
pub const COLLATED_FILE: &str = "collated.json";
pub const CSV_FILE: &str = "data.csv";

/// Errors from writing or reading output files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error for {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(String),
}

impl OutputError {
    pub(crate) fn fs(path: &Path, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Paths of the three output files for one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub historical: PathBuf,
    pub collated: PathBuf,
    pub csv: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            historical: dir.join(HISTORICAL_FILE),
            collated: dir.join(COLLATED_FILE),
            csv: dir.join(CSV_FILE),
            dir,
        }
    }
}

/// Create the output directory (and parents) if absent.
///
/// Succeeds if it already exists; existing contents are left alone.
pub fn ensure_output_dir(path: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(path).map_err(|e| OutputError::fs(path, e))
}

/// Write text to a file, replacing any existing file.
pub fn write_text(path: &Path, text: &str) -> Result<(), OutputError> {
    write_atomic(path, text.as_bytes())
}

/// Write bytes to `{path}.tmp` then rename over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let tmp_path = tmp_path(path);
    fs::write(&tmp_path, bytes).map_err(|e| OutputError::fs(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        OutputError::fs(path, e)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_paths_layout() {
        let paths = OutputPaths::new("out");
        assert_eq!(paths.historical, Path::new("out/historical.json"));
        assert_eq!(paths.collated, Path::new("out/collated.json"));
        assert_eq!(paths.csv, Path::new("out/data.csv"));
    }

    #[test]
    fn ensure_output_dir_is_idempotent_and_keeps_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("output");

        ensure_output_dir(&dir).unwrap();
        fs::write(dir.join("notes.txt"), "keep me").unwrap();
        ensure_output_dir(&dir).unwrap();

        assert_eq!(fs::read_to_string(dir.join("notes.txt")).unwrap(), "keep me");
    }

    #[test]
    fn ensure_output_dir_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_output_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn ensure_output_dir_fails_on_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        fs::write(&file, "x").unwrap();
        let err = ensure_output_dir(&file).unwrap_err();
        assert!(matches!(err, OutputError::Filesystem { .. }));
    }

    #[test]
    fn write_text_overwrites_and_leaves_no_tmp() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data.csv");

        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!tmp.path().join("data.csv.tmp").exists());
    }

    #[test]
    fn write_text_into_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing/data.csv");
        assert!(matches!(
            write_text(&path, "x"),
            Err(OutputError::Filesystem { .. })
        ));
    }
}
