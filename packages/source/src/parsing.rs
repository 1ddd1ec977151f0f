//! Lenient JSON parsing for hand-edited spot files.
//!
//! Spot collections are often exported from spreadsheets or edited by
//! hand, so they arrive with a byte-order mark, non-breaking spaces,
//! trailing commas, or stray carriage returns and tabs. [`clean`] repairs
//! exactly those malformations; anything else is left for the JSON parser
//! to reject.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use spotmap_spot_models::{Spot, value_kind};

use crate::SourceError;

/// A comma followed (ignoring whitespace) by a closing brace or bracket.
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

/// Runs of carriage returns and tabs.
static CR_TAB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\t]+").expect("valid regex"));

const BOM: char = '\u{feff}';
const NBSP: char = '\u{a0}';

/// Repairs the malformations the lenient parser tolerates.
///
/// The pipeline:
/// 1. Strip a byte-order mark at offset 0
/// 2. Replace non-breaking spaces with spaces
/// 3. Remove commas directly before `}` or `]`
/// 4. Strip carriage returns and tabs
#[must_use]
pub fn clean(text: &str) -> String {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let text = text.replace(NBSP, " ");
    let text = TRAILING_COMMA_RE.replace_all(&text, "$1");
    CR_TAB_RE.replace_all(&text, "").into_owned()
}

/// Repairs and parses JSON text.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] if the repaired text is still not valid
/// JSON. The error keeps the repaired text for diagnostics.
pub fn parse_lenient(text: &str) -> Result<Value, SourceError> {
    let cleaned = clean(text);
    serde_json::from_str(&cleaned).map_err(|source| SourceError::Parse { source, cleaned })
}

/// Repairs and parses raw bytes that are expected to hold JSON text.
///
/// # Errors
///
/// Returns [`SourceError::InputType`] if the bytes are not UTF-8 text, or
/// [`SourceError::Parse`] if the repaired text is not valid JSON.
pub fn parse_lenient_bytes(bytes: &[u8]) -> Result<Value, SourceError> {
    let text = std::str::from_utf8(bytes)?;
    parse_lenient(text)
}

/// Converts a parsed document into a spot collection.
///
/// # Errors
///
/// Returns [`SourceError::Structural`] if the document is not an array, or
/// if any element is not an object.
pub fn spots_from_value(value: Value) -> Result<Vec<Spot>, SourceError> {
    let Value::Array(items) = value else {
        return Err(SourceError::Structural {
            message: format!("expected a JSON array, found {}", value_kind(&value)),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(Spot::from(map)),
            other => Err(SourceError::Structural {
                message: format!("element {i} is {}, expected an object", value_kind(&other)),
            }),
        })
        .collect()
}

/// Leniently parses a spot collection from text.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] or [`SourceError::Structural`].
pub fn parse_spots(text: &str) -> Result<Vec<Spot>, SourceError> {
    spots_from_value(parse_lenient(text)?)
}

/// Reads and leniently parses a file.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_lenient_bytes`].
pub fn read_lenient(path: &Path) -> Result<Value, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_lenient_bytes(&bytes)
}

/// Reads and leniently parses a spot collection file.
///
/// # Errors
///
/// Returns the errors of [`read_lenient`] and [`spots_from_value`].
pub fn read_spots(path: &Path) -> Result<Vec<Spot>, SourceError> {
    let spots = spots_from_value(read_lenient(path)?)?;
    log::debug!("Read {} spots from {}", spots.len(), path.display());
    Ok(spots)
}
