#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset assembly for the spot map.
//!
//! Turns a flat spot collection into the per-category files the display
//! layer loads, and back:
//!
//! | Step | Input | Output |
//! |------|-------|--------|
//! | [`sanitize`] | hand-edited JSON | pretty-printed JSON (or `.clean.txt`) |
//! | [`partition`] | flat collection | `<slug>/spots.json` + `index.json` |
//! | [`merge`] | `index.json` + category files | deduplicated flat collection |
//! | [`derive`] | flat collection | collection with scores and badges |
//!
//! Every step reads whole files into memory and either completes or
//! returns an error; nothing is retried.

pub mod derive;
pub mod merge;
pub mod partition;
pub mod sanitize;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use spotmap_source::SourceError;

pub use spotmap_spot_models::INDEX_FILE;

/// Name of the spot file inside each category directory.
pub const CATEGORY_FILE: &str = "spots.json";

/// Errors that can occur while reading or writing dataset files.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// A file could not be parsed into spots.
    #[error("{}: {source}", .path.display())]
    Source {
        /// The offending file.
        path: PathBuf,
        /// Underlying parse or structure error.
        source: SourceError,
    },

    /// A JSON document could not be decoded or encoded.
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        /// The offending file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A JSON document does not have the required shape.
    #[error("Structural error in {}: {message}", .path.display())]
    Structural {
        /// The offending file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error (file read/write).
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The file or directory that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl GenerateError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn source_at(path: &Path, source: SourceError) -> Self {
        Self::Source {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes `value` as pretty-printed JSON.
///
/// Uses an atomic write pattern (write to `.tmp`, then rename) so an
/// interrupted run never leaves a truncated file behind.
///
/// # Errors
///
/// Returns [`GenerateError`] if encoding or any file operation fails.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), GenerateError> {
    let contents = serde_json::to_string_pretty(value).map_err(|source| GenerateError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = tmp_path_for(path);
    std::fs::write(&tmp_path, contents).map_err(|e| GenerateError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| GenerateError::io(path, e))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Creates `dir` and all of its parents.
fn create_dir_all(dir: &Path) -> Result<(), GenerateError> {
    std::fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn writes_pretty_json_without_leftover_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &json!([{"a": 1}])).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  {\n"));
        assert!(!dir.path().join("out.json.tmp").exists());
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "stale").unwrap();
        write_json(&path, &json!([])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn write_into_missing_directory_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_json(&path, &json!([])).unwrap_err();
        assert!(matches!(err, GenerateError::Io { .. }));
        assert!(err.to_string().contains("out.json.tmp"));
    }
}
