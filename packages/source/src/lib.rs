#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spot input handling: lenient parsing and category classification.
//!
//! Raw spot files go through [`parsing`] before anything else touches
//! them. [`type_mapping`] turns a spot's raw type tags into category slugs
//! using the [`registry::CategoryTable`].

pub mod parsing;
pub mod progress;
pub mod registry;
pub mod type_mapping;

use std::path::PathBuf;

/// Errors that can occur while reading spot input or category
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The input was not text.
    #[error("Input is not UTF-8 text: {0}")]
    InputType(#[from] std::str::Utf8Error),

    /// The text was not valid JSON, even after repair.
    #[error("JSON parse error after repair: {source}")]
    Parse {
        /// Underlying parser error.
        source: serde_json::Error,
        /// The repaired text that still failed to parse.
        cleaned: String,
    },

    /// The document parsed but does not have the required shape.
    #[error("Structural error: {message}")]
    Structural {
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error (file read/write).
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// The file that could not be accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Category table configuration error.
    #[error("Category configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}
