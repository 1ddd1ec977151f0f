//! Repair a hand-edited spot file into strict, pretty-printed JSON.
//!
//! When the input still fails to parse after repair, the repaired text is
//! written next to the output as `<name>.clean.txt` so the remaining syntax
//! error can be located. The input file is never modified.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde_json::Value;
use spotmap_source::SourceError;
use spotmap_source::parsing::parse_lenient_bytes;

use crate::{GenerateError, write_json};

const CLEAN_ARTIFACT_SUFFIX: &str = ".clean.txt";

/// Returns the path of the diagnostic artifact for `output`.
///
/// A trailing `.json` (any case) is replaced by `.clean.txt`; any other
/// name gets `.clean.txt` appended.
#[must_use]
pub fn clean_artifact_path(output: &Path) -> PathBuf {
    let raw = output.as_os_str().to_string_lossy();
    let stem_len = raw.len().saturating_sub(".json".len());
    let has_json_ext = raw.is_char_boundary(stem_len)
        && raw.get(stem_len..).is_some_and(|ext| ext.eq_ignore_ascii_case(".json"));

    if has_json_ext {
        PathBuf::from(format!("{}{CLEAN_ARTIFACT_SUFFIX}", &raw[..stem_len]))
    } else {
        let mut name = OsString::from(output.as_os_str());
        name.push(CLEAN_ARTIFACT_SUFFIX);
        PathBuf::from(name)
    }
}

/// Number of records in a parsed document: the array length, or 1.
#[must_use]
pub fn record_count(value: &Value) -> usize {
    value.as_array().map_or(1, Vec::len)
}

/// Leniently parses `input` and writes it pretty-printed to `output`.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`GenerateError::Source`] if the input is not UTF-8 or is not
/// valid JSON after repair; in the latter case the repaired text has been
/// written to [`clean_artifact_path`]. Returns [`GenerateError::Io`] if a
/// file cannot be read or written.
pub fn sanitize(input: &Path, output: &Path) -> Result<usize, GenerateError> {
    let bytes = std::fs::read(input).map_err(|e| GenerateError::io(input, e))?;

    let value = match parse_lenient_bytes(&bytes) {
        Ok(value) => value,
        Err(e) => {
            if let SourceError::Parse { cleaned, .. } = &e {
                let artifact = clean_artifact_path(output);
                std::fs::write(&artifact, cleaned)
                    .map_err(|err| GenerateError::io(&artifact, err))?;
                log::error!(
                    "{}: still invalid after repair, cleaned text written to {}",
                    input.display(),
                    artifact.display()
                );
            }
            return Err(GenerateError::source_at(input, e));
        }
    };

    write_json(output, &value)?;
    let count = record_count(&value);
    log::info!("Sanitized {} -> {} ({count} records)", input.display(), output.display());
    Ok(count)
}
